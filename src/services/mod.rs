//! Service layer for annotarff business logic.
//!
//! This module contains domain logic separated from UI concerns.

pub mod annotate;

pub use annotate::{
    resolve_classes, AnnotationEvent, AnnotationResult, AnnotationService, ClassFailure,
    ResolvedClasses,
};
