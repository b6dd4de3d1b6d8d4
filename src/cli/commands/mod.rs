//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to the annotate command.

mod annotate;

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::annotator::AnnotatorOptions;

use super::helpers::parse_key_value;

#[derive(Parser, Debug)]
#[command(name = "annotarff")]
#[command(
    about = "Annotate PubMed abstracts with the BioPortal annotator and export the matched terms as ARFF"
)]
#[command(version)]
pub struct Cli {
    /// PubMed XML export to annotate
    pub input: PathBuf,

    /// BioPortal API key
    #[arg(env = "BIOPORTAL_API_KEY", hide_env_values = true)]
    pub apikey: String,

    /// Output ARFF file [default: output.arff]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub options: OptionArgs,

    /// Fetch full details for every annotated class and print them
    #[arg(long)]
    pub resolve_classes: bool,

    /// ARFF relation name [default: pubmed_annotations]
    #[arg(long)]
    pub relation: Option<String>,

    /// Annotator endpoint (overrides config)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print raw annotator responses
    #[arg(short, long)]
    pub debug: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Annotator options, forwarded as-is. Boolean options take an optional
/// value: `--exclude-numbers` means true, `--exclude-numbers=false` sends false.
#[derive(Args, Debug, Default, Clone)]
pub struct OptionArgs {
    /// Ontology acronyms to restrict matches to (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "ID")]
    pub ontologies: Vec<String>,

    /// Semantic type IDs to restrict matches to (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "ID")]
    pub semantic_types: Vec<String>,

    /// Also use the immediate children of the given semantic types
    #[arg(long = "semantic-type-hierarchy", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_name = "BOOL")]
    pub expand_semantic_types_hierarchy: Option<bool>,

    /// Include ancestors of matched classes
    #[arg(long, num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_name = "BOOL")]
    pub expand_class_hierarchy: Option<bool>,

    /// Depth of the class hierarchy to include
    #[arg(long, value_name = "N")]
    pub class_hierarchy_max_level: Option<u32>,

    /// Use manual mappings (UMLS, REST, CUI, OBOXREF)
    #[arg(long, num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_name = "BOOL")]
    pub expand_mappings: Option<bool>,

    /// Stop words replacing the service's default list (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "WORD")]
    pub stop_words: Vec<String>,

    /// Minimum length of a match
    #[arg(long, value_name = "N")]
    pub minimum_match_length: Option<u32>,

    /// Ignore numbers when matching
    #[arg(long, num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_name = "BOOL")]
    pub exclude_numbers: Option<bool>,

    /// Only match whole words
    #[arg(long, num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_name = "BOOL")]
    pub whole_word_only: Option<bool>,

    /// Only match preferred labels, not synonyms
    #[arg(long, alias = "exclude-synonymes", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_name = "BOOL")]
    pub exclude_synonyms: Option<bool>,

    /// Only return the longest match for a phrase (always on for batch runs)
    #[arg(long, alias = "longest_only", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_name = "BOOL")]
    pub longest_only: Option<bool>,

    /// Extra annotator parameter, repeatable
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
}

impl From<OptionArgs> for AnnotatorOptions {
    fn from(args: OptionArgs) -> Self {
        AnnotatorOptions {
            ontologies: args.ontologies,
            semantic_types: args.semantic_types,
            expand_semantic_types_hierarchy: args.expand_semantic_types_hierarchy,
            expand_class_hierarchy: args.expand_class_hierarchy,
            class_hierarchy_max_level: args.class_hierarchy_max_level,
            expand_mappings: args.expand_mappings,
            stop_words: args.stop_words,
            minimum_match_length: args.minimum_match_length,
            exclude_numbers: args.exclude_numbers,
            whole_word_only: args.whole_word_only,
            exclude_synonyms: args.exclude_synonyms,
            longest_only: args.longest_only,
            extra: args.params.into_iter().collect(),
        }
    }
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    annotate::cmd_annotate(cli).await
}
