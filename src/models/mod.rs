//! Data models for annotarff.

mod annotation;
mod document;

pub use annotation::{
    AnnotatedClass, Annotation, ClassDetails, ClassLinks, DocumentAnnotations, HierarchyEntry,
    MatchType, TermMatch,
};
pub use document::Document;
