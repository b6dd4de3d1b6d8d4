//! Types shared by annotator backends.

use std::fmt;

use thiserror::Error;

use crate::models::Annotation;

/// Response format requested from the annotator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ResponseFormat {
    #[default]
    Json,
    Xml,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Annotator output for one text.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotatorResponse {
    /// Decoded JSON annotations.
    Json(Vec<Annotation>),
    /// Raw XML body, not decoded.
    Xml(String),
}

impl AnnotatorResponse {
    /// Format the response was returned in.
    pub fn format(&self) -> ResponseFormat {
        match self {
            Self::Json(_) => ResponseFormat::Json,
            Self::Xml(_) => ResponseFormat::Xml,
        }
    }

    /// Decoded annotations, if the response was JSON.
    pub fn into_annotations(self) -> Option<Vec<Annotation>> {
        match self {
            Self::Json(annotations) => Some(annotations),
            Self::Xml(_) => None,
        }
    }
}

/// Errors from the annotation service.
#[derive(Debug, Error)]
pub enum AnnotatorError {
    #[error("Invalid annotator endpoint {0}: {1}")]
    InvalidEndpoint(String, url::ParseError),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Expected a {expected} response, got {got}")]
    UnexpectedFormat {
        expected: ResponseFormat,
        got: ResponseFormat,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl AnnotatorError {
    /// HTTP status, when the service answered with an error status.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
