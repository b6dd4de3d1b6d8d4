//! Annotator query options.
//!
//! Options are forwarded to the service verbatim. Nothing here validates
//! values: the service defines their meaning and defaults, and an option
//! left unset is simply not sent.
//!
//! Filtering and query behavior understood by the service:
//! - `ontologies`, `semantic_types`: restrict matches to these IDs
//! - `expand_semantic_types_hierarchy`: also use the immediate children of
//!   the given semantic types (default false)
//! - `expand_class_hierarchy`, `class_hierarchy_max_level`: include
//!   ancestors of matched classes up to the given depth (default false, 0)
//! - `expand_mappings`: follow UMLS, REST, CUI and OBOXREF mappings
//!   (default false)
//! - `stop_words`: replaces the service's built-in English stop-word list
//! - `minimum_match_length`, `exclude_numbers` (default false),
//!   `whole_word_only` (default true), `exclude_synonyms` (default false)
//! - `longest_only`: only return the longest match for a phrase
//!   (default false)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Form fields the client and the named options always own. Extra
/// parameters may not override them.
pub const RESERVED_FIELDS: &[&str] = &[
    "apikey",
    "text",
    "format",
    "ontologies",
    "semantic_types",
    "expand_semantic_types_hierarchy",
    "expand_class_hierarchy",
    "class_hierarchy_max_level",
    "expand_mappings",
    "stop_words",
    "minimum_match_length",
    "exclude_numbers",
    "whole_word_only",
    "exclude_synonyms",
    "longest_only",
];

/// Whether `key` names a field that extra parameters may not set.
pub fn is_reserved_field(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

/// Optional parameters for an annotation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatorOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ontologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub semantic_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand_semantic_types_hierarchy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand_class_hierarchy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_hierarchy_max_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand_mappings: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_words: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_match_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_numbers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whole_word_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_synonyms: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longest_only: Option<bool>,
    /// Additional parameters sent as-is. Keys in [`RESERVED_FIELDS`] are
    /// never sent.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl AnnotatorOptions {
    pub fn with_longest_only(mut self, longest_only: bool) -> Self {
        self.longest_only = Some(longest_only);
        self
    }

    pub fn with_ontologies<I, S>(mut self, ontologies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ontologies = ontologies.into_iter().map(Into::into).collect();
        self
    }

    /// Overlay `other` on top of `self`: every option set in `other` wins.
    pub fn merge(mut self, other: AnnotatorOptions) -> Self {
        fn pick<T>(base: &mut Option<T>, over: Option<T>) {
            if over.is_some() {
                *base = over;
            }
        }
        fn pick_list(base: &mut Vec<String>, over: Vec<String>) {
            if !over.is_empty() {
                *base = over;
            }
        }

        pick_list(&mut self.ontologies, other.ontologies);
        pick_list(&mut self.semantic_types, other.semantic_types);
        pick(
            &mut self.expand_semantic_types_hierarchy,
            other.expand_semantic_types_hierarchy,
        );
        pick(&mut self.expand_class_hierarchy, other.expand_class_hierarchy);
        pick(
            &mut self.class_hierarchy_max_level,
            other.class_hierarchy_max_level,
        );
        pick(&mut self.expand_mappings, other.expand_mappings);
        pick_list(&mut self.stop_words, other.stop_words);
        pick(&mut self.minimum_match_length, other.minimum_match_length);
        pick(&mut self.exclude_numbers, other.exclude_numbers);
        pick(&mut self.whole_word_only, other.whole_word_only);
        pick(&mut self.exclude_synonyms, other.exclude_synonyms);
        pick(&mut self.longest_only, other.longest_only);
        self.extra.extend(other.extra);
        self
    }

    /// Form fields for the set options, in a stable order.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::new();

        let mut list = |key: &str, values: &[String]| {
            if !values.is_empty() {
                fields.push((key.to_string(), values.join(",")));
            }
        };
        list("ontologies", &self.ontologies);
        list("semantic_types", &self.semantic_types);
        list("stop_words", &self.stop_words);

        let flags = [
            (
                "expand_semantic_types_hierarchy",
                self.expand_semantic_types_hierarchy,
            ),
            ("expand_class_hierarchy", self.expand_class_hierarchy),
            ("expand_mappings", self.expand_mappings),
            ("exclude_numbers", self.exclude_numbers),
            ("whole_word_only", self.whole_word_only),
            ("exclude_synonyms", self.exclude_synonyms),
            ("longest_only", self.longest_only),
        ];
        for (key, value) in flags {
            if let Some(value) = value {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        let levels = [
            ("class_hierarchy_max_level", self.class_hierarchy_max_level),
            ("minimum_match_length", self.minimum_match_length),
        ];
        for (key, value) in levels {
            if let Some(value) = value {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        for (key, value) in &self.extra {
            if is_reserved_field(key) {
                warn!("Ignoring extra parameter {}: set by a named option", key);
                continue;
            }
            fields.push((key.clone(), value.clone()));
        }

        fields
    }
}
