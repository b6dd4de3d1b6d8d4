//! BioPortal annotator client.
//!
//! Submits text to the annotator REST API and resolves the ontology
//! classes it returns.

mod backend;
mod client;
mod config;
mod options;
mod types;
mod user_agent;

pub use backend::AnnotationBackend;
pub use client::AnnotatorClient;
pub use config::{AnnotatorConfig, DEFAULT_ENDPOINT};
pub use options::{is_reserved_field, AnnotatorOptions, RESERVED_FIELDS};
pub use types::{AnnotatorError, AnnotatorResponse, ResponseFormat};
pub use user_agent::{resolve_user_agent, USER_AGENT};
