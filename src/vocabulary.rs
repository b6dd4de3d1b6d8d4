//! Term vocabulary built from annotator matches.
//!
//! Each matched span is normalized into a term. Terms are deduplicated per
//! document (first occurrence wins) and across the whole batch. The global
//! list keeps first-seen order so the ARFF output is reproducible.

use std::collections::HashSet;

use crate::models::DocumentAnnotations;

/// Normalize a matched span: lower-case it, then turn every space and
/// apostrophe into a hyphen.
pub fn normalize_term(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '\'' { '-' } else { c })
        .collect()
}

/// Terms of one document, deduplicated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalTerms {
    terms: Vec<String>,
    seen: HashSet<String>,
}

impl LocalTerms {
    /// Add a normalized term. Returns false if it was already present.
    pub fn insert(&mut self, term: String) -> bool {
        if self.seen.contains(&term) {
            return false;
        }
        self.seen.insert(term.clone());
        self.terms.push(term);
        true
    }

    pub fn contains(&self, term: &str) -> bool {
        self.seen.contains(term)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for LocalTerms {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut local = LocalTerms::default();
        for term in iter {
            local.insert(term.into());
        }
        local
    }
}

/// Per-document term lists plus the global vocabulary.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    documents: Vec<LocalTerms>,
    terms: Vec<String>,
    seen: HashSet<String>,
}

impl Vocabulary {
    /// Build the vocabulary from annotated documents, in document order.
    pub fn build(results: &[DocumentAnnotations]) -> Self {
        let mut vocabulary = Self::default();
        for result in results {
            vocabulary.add_document(result.matched_texts().map(normalize_term).collect());
        }
        vocabulary
    }

    /// Build directly from per-document term lists, which are taken as
    /// already normalized.
    pub fn from_local_terms<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = LocalTerms>,
    {
        let mut vocabulary = Self::default();
        for local in documents {
            vocabulary.add_document(local);
        }
        vocabulary
    }

    /// Append the next document's terms.
    pub fn add_document(&mut self, local: LocalTerms) {
        for term in local.terms() {
            if self.seen.insert(term.clone()) {
                self.terms.push(term.clone());
            }
        }
        self.documents.push(local);
    }

    /// Global vocabulary, in first-seen order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Per-document term lists, in document order.
    pub fn documents(&self) -> &[LocalTerms] {
        &self.documents
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
