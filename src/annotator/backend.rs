//! AnnotationBackend trait, the seam between the batch service and the
//! remote annotator.

use async_trait::async_trait;

use crate::models::ClassDetails;

use super::options::AnnotatorOptions;
use super::types::{AnnotatorError, AnnotatorResponse, ResponseFormat};

/// A service that annotates text and resolves ontology classes.
#[async_trait]
pub trait AnnotationBackend: Send + Sync {
    /// Annotate one text with the given options.
    async fn annotate(
        &self,
        text: &str,
        format: ResponseFormat,
        options: &AnnotatorOptions,
    ) -> Result<AnnotatorResponse, AnnotatorError>;

    /// Fetch full details for a class from its `links.self` resource.
    async fn fetch_class(&self, url: &str) -> Result<ClassDetails, AnnotatorError>;
}
