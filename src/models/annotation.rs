//! Annotator response models.
//!
//! The annotator returns a JSON array with one entry per matched ontology
//! class. Each entry carries the class reference, the text spans that
//! matched it and, when hierarchy expansion was requested, the ancestors
//! of the class together with their distance.

use serde::{Deserialize, Serialize};

/// How a span matched its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchType {
    /// Matched the preferred label exactly.
    Pref,
    /// Matched one of the class synonyms.
    Syn,
    #[serde(other)]
    Other,
}

/// Links attached to a class reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLinks {
    /// REST resource for the full class details.
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// REST resource of the owning ontology.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ontology: Option<String>,
}

/// Reference to an ontology class inside an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedClass {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "prefLabel", default, skip_serializing_if = "Option::is_none")]
    pub pref_label: Option<String>,
    #[serde(default)]
    pub links: ClassLinks,
}

/// One matched span of the submitted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermMatch {
    pub from: usize,
    pub to: usize,
    pub match_type: MatchType,
    pub text: String,
}

/// Ancestor of an annotated class, returned with hierarchy expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyEntry {
    pub annotated_class: AnnotatedClass,
    pub distance: u32,
}

/// All matches of a single class in one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub annotated_class: AnnotatedClass,
    #[serde(default)]
    pub annotations: Vec<TermMatch>,
    #[serde(default)]
    pub hierarchy: Vec<HierarchyEntry>,
    #[serde(default)]
    pub mappings: Vec<serde_json::Value>,
}

/// Decoded annotator output for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentAnnotations {
    /// 1-based index of the source document.
    pub document: usize,
    pub annotations: Vec<Annotation>,
}

impl DocumentAnnotations {
    /// Matched surface texts in response order.
    pub fn matched_texts(&self) -> impl Iterator<Item = &str> {
        self.annotations
            .iter()
            .flat_map(|a| a.annotations.iter().map(|m| m.text.as_str()))
    }
}

/// Full class details fetched from the class resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDetails {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "prefLabel", default)]
    pub pref_label: Option<String>,
    #[serde(default)]
    pub links: ClassLinks,
    /// Distance from the annotated class, for hierarchy ancestors.
    #[serde(skip)]
    pub distance: Option<u32>,
}

impl ClassDetails {
    /// Owning ontology acronym, taken from the last segment of the ontology link.
    pub fn ontology_acronym(&self) -> Option<&str> {
        self.links
            .ontology
            .as_deref()
            .and_then(|link| link.trim_end_matches('/').rsplit('/').next())
            .filter(|s| !s.is_empty())
    }
}
