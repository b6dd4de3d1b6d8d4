//! Batch annotation service.
//!
//! Sends each document to the annotator in order, optionally resolves the
//! returned classes, and emits events for progress tracking. Separated from
//! UI concerns.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::annotator::{AnnotationBackend, AnnotatorError, AnnotatorOptions, ResponseFormat};
use crate::models::{AnnotatedClass, ClassDetails, Document, DocumentAnnotations};

/// Events emitted during annotation processing.
#[derive(Debug, Clone)]
pub enum AnnotationEvent {
    /// Annotation started
    Started { total_documents: usize },
    /// Document sent to the annotator
    DocumentStarted { document: usize, text: String },
    /// Document annotated
    DocumentCompleted { document: usize, annotations: usize },
    /// Class details fetched
    ClassResolved {
        document: usize,
        details: ClassDetails,
    },
    /// Class details could not be fetched; the class is skipped
    ClassFailed {
        document: usize,
        url: String,
        error: String,
    },
    /// Annotation complete
    Complete {
        documents: usize,
        resolved_classes: usize,
        failed_classes: usize,
    },
}

/// A class whose details could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFailure {
    pub document: usize,
    pub url: String,
    pub error: String,
}

/// Classes resolved for one or more documents.
#[derive(Debug, Clone, Default)]
pub struct ResolvedClasses {
    /// (document index, details), in response order.
    pub classes: Vec<(usize, ClassDetails)>,
    pub failures: Vec<ClassFailure>,
}

impl ResolvedClasses {
    fn extend(&mut self, other: ResolvedClasses) {
        self.classes.extend(other.classes);
        self.failures.extend(other.failures);
    }
}

/// Result of annotation processing.
#[derive(Debug, Default)]
pub struct AnnotationResult {
    pub documents: Vec<DocumentAnnotations>,
    pub resolved: ResolvedClasses,
}

/// Service for annotating a batch of documents.
pub struct AnnotationService<B> {
    backend: B,
    options: AnnotatorOptions,
    resolve_classes: bool,
}

impl<B: AnnotationBackend> AnnotationService<B> {
    /// Create a new annotation service.
    ///
    /// Batch annotation always requests longest matches only, whatever
    /// `options.longest_only` says.
    pub fn new(backend: B, mut options: AnnotatorOptions) -> Self {
        options.extra.remove("longest_only");
        Self {
            backend,
            options: options.with_longest_only(true),
            resolve_classes: false,
        }
    }

    /// Also fetch full details for every annotated class.
    pub fn with_class_resolution(mut self, resolve_classes: bool) -> Self {
        self.resolve_classes = resolve_classes;
        self
    }

    /// Options sent with every request.
    pub fn options(&self) -> &AnnotatorOptions {
        &self.options
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Annotate a single document.
    pub async fn annotate_document(
        &self,
        doc: &Document,
    ) -> Result<DocumentAnnotations, AnnotatorError> {
        let response = self
            .backend
            .annotate(&doc.text, ResponseFormat::Json, &self.options)
            .await?;
        let got = response.format();
        let annotations =
            response
                .into_annotations()
                .ok_or(AnnotatorError::UnexpectedFormat {
                    expected: ResponseFormat::Json,
                    got,
                })?;

        Ok(DocumentAnnotations {
            document: doc.index,
            annotations,
        })
    }

    /// Annotate documents in order. The first annotator error aborts the batch.
    pub async fn annotate(
        &self,
        docs: &[Document],
        event_tx: mpsc::Sender<AnnotationEvent>,
    ) -> anyhow::Result<AnnotationResult> {
        let _ = event_tx
            .send(AnnotationEvent::Started {
                total_documents: docs.len(),
            })
            .await;

        let mut result = AnnotationResult::default();

        for doc in docs {
            let _ = event_tx
                .send(AnnotationEvent::DocumentStarted {
                    document: doc.index,
                    text: doc.text.clone(),
                })
                .await;

            let annotated = self.annotate_document(doc).await.map_err(|e| {
                anyhow::Error::new(e).context(format!("Annotating document {}", doc.index))
            })?;
            debug!(
                "Document {}: {} annotated classes",
                doc.index,
                annotated.annotations.len()
            );

            if self.resolve_classes {
                let resolved = resolve_classes(&self.backend, &annotated, Some(&event_tx)).await;
                result.resolved.extend(resolved);
            }

            let _ = event_tx
                .send(AnnotationEvent::DocumentCompleted {
                    document: doc.index,
                    annotations: annotated.annotations.len(),
                })
                .await;
            result.documents.push(annotated);
        }

        let _ = event_tx
            .send(AnnotationEvent::Complete {
                documents: result.documents.len(),
                resolved_classes: result.resolved.classes.len(),
                failed_classes: result.resolved.failures.len(),
            })
            .await;

        Ok(result)
    }
}

/// Fetch details for every class of one document: each annotated class,
/// then each of its hierarchy ancestors.
///
/// A failed fetch is logged and the class skipped; the remaining classes
/// are still resolved.
pub async fn resolve_classes<B: AnnotationBackend + ?Sized>(
    backend: &B,
    annotated: &DocumentAnnotations,
    event_tx: Option<&mpsc::Sender<AnnotationEvent>>,
) -> ResolvedClasses {
    let document = annotated.document;
    let mut resolved = ResolvedClasses::default();

    let targets = annotated.annotations.iter().flat_map(|a| {
        std::iter::once((&a.annotated_class, None)).chain(
            a.hierarchy
                .iter()
                .map(|h| (&h.annotated_class, Some(h.distance))),
        )
    });

    for (class, distance) in targets {
        let Some(url) = class.links.self_link.as_deref() else {
            debug!("Class {} has no self link, skipping", class.id);
            continue;
        };

        match backend.fetch_class(url).await {
            Ok(details) => {
                let details = with_fallbacks(details, class, distance);
                if let Some(tx) = event_tx {
                    let _ = tx
                        .send(AnnotationEvent::ClassResolved {
                            document,
                            details: details.clone(),
                        })
                        .await;
                }
                resolved.classes.push((document, details));
            }
            Err(e) => {
                warn!("Skipping class {} in document {}: {}", url, document, e);
                let failure = ClassFailure {
                    document,
                    url: url.to_string(),
                    error: e.to_string(),
                };
                if let Some(tx) = event_tx {
                    let _ = tx
                        .send(AnnotationEvent::ClassFailed {
                            document,
                            url: failure.url.clone(),
                            error: failure.error.clone(),
                        })
                        .await;
                }
                resolved.failures.push(failure);
            }
        }
    }

    resolved
}

/// Fill gaps in fetched details from the reference they were fetched for.
fn with_fallbacks(
    mut details: ClassDetails,
    class: &AnnotatedClass,
    distance: Option<u32>,
) -> ClassDetails {
    details.distance = distance;
    if details.pref_label.is_none() {
        details.pref_label = class.pref_label.clone();
    }
    if details.links.ontology.is_none() {
        details.links.ontology = class.links.ontology.clone();
    }
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::annotator::AnnotatorResponse;
    use crate::models::{Annotation, ClassLinks, HierarchyEntry, MatchType, TermMatch};

    /// In-process annotator keyed by document text.
    #[derive(Default)]
    struct FakeBackend {
        responses: HashMap<String, Vec<Annotation>>,
        failing_classes: HashSet<String>,
        failing_texts: HashSet<String>,
        xml_texts: HashSet<String>,
        seen_options: Mutex<Vec<AnnotatorOptions>>,
        fetched: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AnnotationBackend for FakeBackend {
        async fn annotate(
            &self,
            text: &str,
            _format: ResponseFormat,
            options: &AnnotatorOptions,
        ) -> Result<AnnotatorResponse, AnnotatorError> {
            self.seen_options.lock().unwrap().push(options.clone());
            if self.failing_texts.contains(text) {
                return Err(AnnotatorError::Status {
                    url: "http://annotator.test".to_string(),
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                });
            }
            if self.xml_texts.contains(text) {
                return Ok(AnnotatorResponse::Xml("<annotationCollection/>".to_string()));
            }
            Ok(AnnotatorResponse::Json(
                self.responses.get(text).cloned().unwrap_or_default(),
            ))
        }

        async fn fetch_class(&self, url: &str) -> Result<ClassDetails, AnnotatorError> {
            self.fetched.lock().unwrap().push(url.to_string());
            if self.failing_classes.contains(url) {
                return Err(AnnotatorError::Status {
                    url: url.to_string(),
                    status: reqwest::StatusCode::NOT_FOUND,
                });
            }
            Ok(ClassDetails {
                id: url.to_string(),
                pref_label: Some(format!("label of {}", url)),
                links: ClassLinks::default(),
                distance: None,
            })
        }
    }

    fn class(name: &str) -> AnnotatedClass {
        AnnotatedClass {
            id: format!("http://purl.bioontology.org/ontology/MESH/{}", name),
            pref_label: None,
            links: ClassLinks {
                self_link: Some(format!("http://classes.test/{}", name)),
                ontology: Some("http://data.bioontology.org/ontologies/MESH".to_string()),
            },
        }
    }

    fn annotation(name: &str, text: &str) -> Annotation {
        Annotation {
            annotated_class: class(name),
            annotations: vec![TermMatch {
                from: 1,
                to: text.len(),
                match_type: MatchType::Pref,
                text: text.to_string(),
            }],
            hierarchy: Vec::new(),
            mappings: Vec::new(),
        }
    }

    fn drain(mut rx: mpsc::Receiver<AnnotationEvent>) -> Vec<AnnotationEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_longest_only_forced_on_batch_path() {
        let backend = FakeBackend::default();
        let caller_options = AnnotatorOptions::default().with_longest_only(false);
        let service = AnnotationService::new(backend, caller_options);

        let docs = vec![Document::new(1, "ALS"), Document::new(2, "Treg")];
        let (tx, _rx) = mpsc::channel(64);
        service.annotate(&docs, tx).await.unwrap();

        let seen = service.backend().seen_options.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|o| o.longest_only == Some(true)));
    }

    #[test]
    fn test_extra_longest_only_is_dropped() {
        let mut caller_options = AnnotatorOptions::default();
        caller_options
            .extra
            .insert("longest_only".to_string(), "false".to_string());
        caller_options
            .extra
            .insert("display_links".to_string(), "false".to_string());
        let service = AnnotationService::new(FakeBackend::default(), caller_options);

        let longest: Vec<(String, String)> = service
            .options()
            .form_fields()
            .into_iter()
            .filter(|(k, _)| k == "longest_only")
            .collect();
        assert_eq!(
            longest,
            vec![("longest_only".to_string(), "true".to_string())]
        );
        assert!(!service.options().extra.contains_key("longest_only"));
        assert!(service.options().extra.contains_key("display_links"));
    }

    #[tokio::test]
    async fn test_non_json_response_is_error() {
        let mut backend = FakeBackend::default();
        backend.xml_texts.insert("first".to_string());
        let service = AnnotationService::new(backend, AnnotatorOptions::default());

        let err = service
            .annotate_document(&Document::new(1, "first"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AnnotatorError::UnexpectedFormat {
                expected: ResponseFormat::Json,
                got: ResponseFormat::Xml,
            }
        ));

        let (tx, _rx) = mpsc::channel(64);
        let err = service
            .annotate(&[Document::new(1, "first")], tx)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("document 1"));
    }

    #[tokio::test]
    async fn test_documents_annotated_in_order() {
        let mut backend = FakeBackend::default();
        backend
            .responses
            .insert("first".to_string(), vec![annotation("D000690", "ALS")]);
        backend.responses.insert(
            "second".to_string(),
            vec![annotation("D016472", "T cell"), annotation("D000069", "Tecfidera")],
        );
        let service = AnnotationService::new(backend, AnnotatorOptions::default());

        let docs = vec![Document::new(1, "first"), Document::new(2, "second")];
        let (tx, rx) = mpsc::channel(64);
        let result = service.annotate(&docs, tx).await.unwrap();

        assert_eq!(result.documents.len(), 2);
        assert_eq!(result.documents[0].document, 1);
        assert_eq!(result.documents[1].annotations.len(), 2);
        assert!(result.resolved.classes.is_empty());

        let events = drain(rx);
        assert!(matches!(
            events.first(),
            Some(AnnotationEvent::Started { total_documents: 2 })
        ));
        assert!(matches!(
            events.last(),
            Some(AnnotationEvent::Complete { documents: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_annotator_error_aborts_batch() {
        let mut backend = FakeBackend::default();
        backend.failing_texts.insert("second".to_string());
        let service = AnnotationService::new(backend, AnnotatorOptions::default());

        let docs = vec![
            Document::new(1, "first"),
            Document::new(2, "second"),
            Document::new(3, "third"),
        ];
        let (tx, _rx) = mpsc::channel(64);
        let err = service.annotate(&docs, tx).await.unwrap_err();

        assert!(err.to_string().contains("document 2"));
        assert_eq!(service.backend().seen_options.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_class_failure_does_not_stop_siblings() {
        let mut backend = FakeBackend::default();
        backend
            .responses
            .insert("first".to_string(), vec![annotation("Z", "ALS")]);
        backend.responses.insert(
            "second".to_string(),
            vec![annotation("X", "T cell"), annotation("Y", "Tecfidera")],
        );
        backend
            .failing_classes
            .insert("http://classes.test/X".to_string());
        let service =
            AnnotationService::new(backend, AnnotatorOptions::default()).with_class_resolution(true);

        let docs = vec![Document::new(1, "first"), Document::new(2, "second")];
        let (tx, rx) = mpsc::channel(64);
        let result = service.annotate(&docs, tx).await.unwrap();

        let resolved: Vec<(usize, &str)> = result
            .resolved
            .classes
            .iter()
            .map(|(doc, d)| (*doc, d.id.as_str()))
            .collect();
        assert_eq!(
            resolved,
            vec![(1, "http://classes.test/Z"), (2, "http://classes.test/Y")]
        );
        assert_eq!(
            result.resolved.failures,
            vec![ClassFailure {
                document: 2,
                url: "http://classes.test/X".to_string(),
                error: "HTTP 404 Not Found from http://classes.test/X".to_string(),
            }]
        );
        assert_eq!(result.documents.len(), 2);

        let failed_events = drain(rx)
            .into_iter()
            .filter(|e| matches!(e, AnnotationEvent::ClassFailed { document: 2, .. }))
            .count();
        assert_eq!(failed_events, 1);
    }

    #[tokio::test]
    async fn test_resolve_hierarchy_carries_distance() {
        let backend = FakeBackend::default();
        let mut a = annotation("D000690", "ALS");
        a.hierarchy.push(HierarchyEntry {
            annotated_class: class("D016472"),
            distance: 2,
        });
        let mut no_link = annotation("D000001", "other");
        no_link.annotated_class.links.self_link = None;

        let annotated = DocumentAnnotations {
            document: 4,
            annotations: vec![a, no_link],
        };
        let resolved = resolve_classes(&backend, &annotated, None).await;

        assert_eq!(resolved.classes.len(), 2);
        assert_eq!(resolved.classes[0].1.distance, None);
        assert_eq!(resolved.classes[1].1.distance, Some(2));
        assert_eq!(
            resolved.classes[1].1.ontology_acronym(),
            Some("MESH")
        );
        assert_eq!(backend.fetched.lock().unwrap().len(), 2);
    }
}
