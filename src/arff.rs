//! ARFF serialization of the document × term matrix.
//!
//! The file declares three nominal attributes (`class`: document index,
//! `annot`: term, `bool`: membership) followed by one dense data row per
//! (document, term) pair.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::vocabulary::Vocabulary;

/// Default `@relation` name.
pub const DEFAULT_RELATION: &str = "pubmed_annotations";

/// Errors writing an ARFF file.
#[derive(Debug, Error)]
pub enum ArffError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Quote a nominal value when it contains characters ARFF treats specially.
pub fn quote_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ',' | '{' | '}' | '%' | '"' | '\'' | '\\'));
    if !needs_quotes {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

/// Line-oriented builder for ARFF text.
#[derive(Debug, Default)]
pub struct ArffBuilder {
    out: String,
}

impl ArffBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn relation(&mut self, name: &str) -> &mut Self {
        let _ = writeln!(self.out, "@relation {}", quote_value(name));
        self
    }

    /// Declare a nominal attribute with the given values.
    pub fn nominal_attribute<I, S>(&mut self, name: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values: Vec<String> = values
            .into_iter()
            .map(|v| quote_value(v.as_ref()))
            .collect();
        let _ = writeln!(
            self.out,
            "@attribute {} {{{}}}",
            quote_value(name),
            values.join(",")
        );
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.out.push('\n');
        self
    }

    pub fn data(&mut self) -> &mut Self {
        self.out.push_str("@data\n");
        self
    }

    /// Append one comma-separated data row.
    pub fn row<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields: Vec<String> = fields
            .into_iter()
            .map(|f| quote_value(f.as_ref()))
            .collect();
        self.out.push_str(&fields.join(","));
        self.out.push('\n');
        self
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Render the vocabulary as ARFF text.
pub fn render(vocabulary: &Vocabulary, relation: &str) -> String {
    let classes: Vec<String> = (1..=vocabulary.document_count())
        .map(|i| i.to_string())
        .collect();

    let mut builder = ArffBuilder::new();
    builder
        .relation(relation)
        .blank()
        .nominal_attribute("class", &classes)
        .nominal_attribute("annot", vocabulary.terms())
        .nominal_attribute("bool", ["true", "false"])
        .blank()
        .data();

    for (class, local) in classes.iter().zip(vocabulary.documents()) {
        for term in vocabulary.terms() {
            let present = if local.contains(term) { "true" } else { "false" };
            builder.row([class.as_str(), term.as_str(), present]);
        }
    }

    builder.finish()
}

/// Write the ARFF file atomically: the target only appears once fully written.
pub fn write_arff(path: &Path, vocabulary: &Vocabulary, relation: &str) -> Result<(), ArffError> {
    let io_err = |source: std::io::Error| ArffError::Io {
        path: path.display().to_string(),
        source,
    };

    let content = render(vocabulary, relation);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    file.write_all(content.as_bytes()).map_err(io_err)?;
    file.persist(path).map_err(|e| io_err(e.error))?;

    info!(
        "Wrote {} ({} documents x {} terms)",
        path.display(),
        vocabulary.document_count(),
        vocabulary.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::LocalTerms;

    fn vocabulary(docs: &[&[&str]]) -> Vocabulary {
        Vocabulary::from_local_terms(
            docs.iter()
                .map(|terms| terms.iter().copied().collect::<LocalTerms>()),
        )
    }

    fn data_lines(arff: &str) -> Vec<&str> {
        arff.lines()
            .skip_while(|line| *line != "@data")
            .collect()
    }

    #[test]
    fn test_header() {
        let vocab = vocabulary(&[&["als"], &["t-cell"]]);
        let arff = render(&vocab, DEFAULT_RELATION);
        let header: Vec<&str> = arff.lines().take(6).collect();
        assert_eq!(
            header,
            vec![
                "@relation pubmed_annotations",
                "",
                "@attribute class {1,2}",
                "@attribute annot {als,t-cell}",
                "@attribute bool {true,false}",
                "",
            ]
        );
    }

    #[test]
    fn test_rows_reflect_local_membership() {
        let vocab = vocabulary(&[&["als", "t-cell"], &["tecfidera"]]);
        let arff = render(&vocab, DEFAULT_RELATION);
        let data = data_lines(&arff);

        assert_eq!(&data[1..4], &["1,als,true", "1,t-cell,true", "1,tecfidera,false"]);
        assert_eq!(&data[4..7], &["2,als,false", "2,t-cell,false", "2,tecfidera,true"]);
    }

    #[test]
    fn test_data_section_is_dense() {
        let vocab = vocabulary(&[&["als", "t-cell"], &["tecfidera"], &[]]);
        let arff = render(&vocab, DEFAULT_RELATION);
        assert_eq!(data_lines(&arff).len(), 1 + 3 * 3);
    }

    #[test]
    fn test_empty_vocabulary() {
        let vocab = vocabulary(&[&[]]);
        let arff = render(&vocab, DEFAULT_RELATION);
        assert!(arff.contains("@attribute annot {}\n"));
        assert_eq!(data_lines(&arff), vec!["@data"]);
    }

    #[test]
    fn test_special_values_quoted() {
        assert_eq!(quote_value("als"), "als");
        assert_eq!(quote_value("1,2-diol"), "'1,2-diol'");
        assert_eq!(quote_value("a\\b"), "'a\\\\b'");
        assert_eq!(quote_value(""), "''");

        let vocab = vocabulary(&[&["1,2-diol"]]);
        let arff = render(&vocab, DEFAULT_RELATION);
        assert!(arff.contains("@attribute annot {'1,2-diol'}"));
        assert!(arff.contains("\n1,'1,2-diol',true\n"));
    }

    #[test]
    fn test_write_arff_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.arff");
        let vocab = vocabulary(&[&["als"]]);

        write_arff(&path, &vocab, "test").unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render(&vocab, "test"));
        assert!(written.ends_with("1,als,true\n"));
    }

    #[test]
    fn test_write_arff_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("output.arff");
        let err = write_arff(&path, &vocabulary(&[&["als"]]), "test").unwrap_err();
        assert!(matches!(err, ArffError::Io { .. }));
        assert!(!path.exists());
    }
}
