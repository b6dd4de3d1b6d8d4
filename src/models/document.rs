//! Article text extracted from a PubMed export.

use serde::{Deserialize, Serialize};

/// One article's title and abstract, as sent to the annotator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// 1-based position of the article in the input file.
    pub index: usize,
    /// Title immediately followed by the abstract text.
    pub text: String,
}

impl Document {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Build the annotated text from a title and an optional abstract.
    ///
    /// The two parts are joined with no separator.
    pub fn from_parts(index: usize, title: &str, abstract_text: Option<&str>) -> Self {
        let mut text = String::with_capacity(title.len() + abstract_text.map_or(0, str::len));
        text.push_str(title);
        if let Some(abstract_text) = abstract_text {
            text.push_str(abstract_text);
        }
        Self { index, text }
    }
}
