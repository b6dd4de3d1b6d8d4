//! Annotate command: PubMed XML in, ARFF out.

use std::path::Path;

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::annotator::{AnnotatorClient, AnnotatorOptions};
use crate::arff::write_arff;
use crate::cli::helpers::{format_class_line, truncate};
use crate::config::{load_settings, resolve_path};
use crate::pubmed::extract_documents;
use crate::services::{AnnotationEvent, AnnotationService};
use crate::vocabulary::Vocabulary;

use super::Cli;

/// Annotate every article of a PubMed export and write the ARFF file.
pub async fn cmd_annotate(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let config_path = cli.config.as_deref().map(|p| expand(p, &cwd));
    let (mut settings, _config) = load_settings(config_path.as_deref()).await?;

    // CLI flags take precedence over the config file
    if let Some(ref output) = cli.output {
        settings.output = expand(output, &cwd);
    }
    if let Some(relation) = cli.relation {
        settings.relation = relation;
    }
    if let Some(endpoint) = cli.endpoint {
        settings.annotator.endpoint = endpoint;
    }
    if cli.debug {
        settings.annotator.debug = true;
    }
    let options = settings
        .options
        .clone()
        .merge(AnnotatorOptions::from(cli.options));

    let input = expand(&cli.input, &cwd);
    let documents = extract_documents(&input)
        .with_context(|| format!("Failed to extract articles from {}", input.display()))?;

    if documents.is_empty() {
        println!(
            "{} No <Article> elements found in {}",
            style("!").yellow(),
            input.display()
        );
    } else {
        println!(
            "{} Extracted {} articles from {}",
            style("→").cyan(),
            documents.len(),
            input.display()
        );
    }

    let debug = settings.annotator.debug;
    let client = AnnotatorClient::new(settings.annotator.clone(), cli.apikey)?;
    let service =
        AnnotationService::new(client, options).with_class_resolution(cli.resolve_classes);

    let (event_tx, mut event_rx) = mpsc::channel::<AnnotationEvent>(100);

    // Raw responses go to stdout in debug mode; keep the bar out of their way
    let progress = if debug {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(documents.len() as u64)
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")?
            .progress_chars("█▓░"),
    );

    let pb = progress.clone();
    let event_handler = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                AnnotationEvent::Started { total_documents } => {
                    pb.set_length(total_documents as u64);
                    pb.set_message("Annotating...");
                }
                AnnotationEvent::DocumentStarted { document, text } => {
                    pb.set_message(format!("#{} {}", document, truncate(&text, 40)));
                }
                AnnotationEvent::DocumentCompleted { .. } => pb.inc(1),
                AnnotationEvent::ClassResolved { document, details } => {
                    pb.suspend(|| println!("{}", format_class_line(document, &details)));
                }
                AnnotationEvent::ClassFailed {
                    document,
                    url,
                    error,
                } => {
                    pb.suspend(|| {
                        println!(
                            "{} Document {}: skipped class {} ({})",
                            style("✗").red(),
                            document,
                            url,
                            error
                        )
                    });
                }
                AnnotationEvent::Complete { .. } => pb.finish_and_clear(),
            }
        }
    });

    let result = service.annotate(&documents, event_tx).await;
    let _ = event_handler.await;
    let result = match result {
        Ok(result) => result,
        Err(e) => {
            progress.abandon();
            return Err(e);
        }
    };

    if cli.resolve_classes {
        println!(
            "{} Resolved {} classes ({} skipped)",
            style("✓").green(),
            result.resolved.classes.len(),
            result.resolved.failures.len()
        );
    }

    let vocabulary = Vocabulary::build(&result.documents);
    write_arff(&settings.output, &vocabulary, &settings.relation)
        .with_context(|| format!("Failed to write {}", settings.output.display()))?;

    println!(
        "{} Wrote {} ({} documents, {} terms)",
        style("✓").green(),
        settings.output.display(),
        vocabulary.document_count(),
        vocabulary.len()
    );

    Ok(())
}

/// Expand `~` and resolve against the working directory.
fn expand(path: &Path, cwd: &Path) -> std::path::PathBuf {
    resolve_path(&path.to_string_lossy(), cwd)
}
