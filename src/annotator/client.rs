//! HTTP client for the BioPortal annotator.

use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::models::{Annotation, ClassDetails};

use super::backend::AnnotationBackend;
use super::config::AnnotatorConfig;
use super::options::AnnotatorOptions;
use super::types::{AnnotatorError, AnnotatorResponse, ResponseFormat};
use super::user_agent::resolve_user_agent;

/// Destination for raw response bodies in debug mode.
type DebugSink = Mutex<Box<dyn Write + Send>>;

/// Annotator client bound to one API key.
pub struct AnnotatorClient {
    config: AnnotatorConfig,
    endpoint: Url,
    api_key: String,
    client: Client,
    debug_sink: Option<DebugSink>,
}

impl AnnotatorClient {
    /// Create a new annotator client with the given configuration.
    pub fn new(config: AnnotatorConfig, api_key: impl Into<String>) -> Result<Self, AnnotatorError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| AnnotatorError::InvalidEndpoint(config.endpoint.clone(), e))?;

        let mut builder = Client::builder()
            .user_agent(resolve_user_agent(config.user_agent.as_deref()))
            .gzip(true);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|source| AnnotatorError::Request {
            url: endpoint.to_string(),
            source,
        })?;

        let debug_sink = config
            .debug
            .then(|| Mutex::new(Box::new(std::io::stdout()) as Box<dyn Write + Send>));

        Ok(Self {
            config,
            endpoint,
            api_key: api_key.into(),
            client,
            debug_sink,
        })
    }

    /// Echo raw response bodies to `writer` instead of stdout. Enables the
    /// echo even when `debug` is off in the config.
    pub fn with_debug_writer<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.debug_sink = Some(Mutex::new(Box::new(writer)));
        self
    }

    /// Get the config.
    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Form fields for an annotation request: `apikey`, `text` and `format`
    /// followed by every set option.
    pub fn request_form(
        &self,
        text: &str,
        format: ResponseFormat,
        options: &AnnotatorOptions,
    ) -> Vec<(String, String)> {
        let mut form = vec![
            ("apikey".to_string(), self.api_key.clone()),
            ("text".to_string(), text.to_string()),
            ("format".to_string(), format.as_str().to_string()),
        ];
        form.extend(options.form_fields());
        form
    }

    /// Value of the `Authorization` header for class resources.
    fn authorization(&self) -> String {
        format!("apikey token={}", self.api_key)
    }

    fn echo(&self, body: &str) {
        let Some(sink) = &self.debug_sink else {
            return;
        };
        if let Ok(mut out) = sink.lock() {
            let _ = writeln!(out, "{}", body);
            let _ = out.flush();
        }
    }

    /// Read the body, echo it in debug mode, then check the status.
    async fn checked_body(
        &self,
        url: &str,
        response: reqwest::Response,
    ) -> Result<String, AnnotatorError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| AnnotatorError::Request {
                url: url.to_string(),
                source,
            })?;

        self.echo(&body);

        if !status.is_success() {
            return Err(AnnotatorError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl AnnotationBackend for AnnotatorClient {
    async fn annotate(
        &self,
        text: &str,
        format: ResponseFormat,
        options: &AnnotatorOptions,
    ) -> Result<AnnotatorResponse, AnnotatorError> {
        let url = self.endpoint.as_str();
        let form = self.request_form(text, format, options);
        debug!("POST {} ({} chars, format={})", url, text.len(), format);

        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&form)
            .send()
            .await
            .map_err(|source| AnnotatorError::Request {
                url: url.to_string(),
                source,
            })?;
        let body = self.checked_body(url, response).await?;

        match format {
            ResponseFormat::Json => {
                let annotations: Vec<Annotation> =
                    serde_json::from_str(&body).map_err(|source| AnnotatorError::Decode {
                        url: url.to_string(),
                        source,
                    })?;
                debug!("Decoded {} annotations", annotations.len());
                Ok(AnnotatorResponse::Json(annotations))
            }
            ResponseFormat::Xml => Ok(AnnotatorResponse::Xml(body)),
        }
    }

    async fn fetch_class(&self, url: &str) -> Result<ClassDetails, AnnotatorError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, self.authorization())
            .send()
            .await
            .map_err(|source| AnnotatorError::Request {
                url: url.to_string(),
                source,
            })?;
        let body = self.checked_body(url, response).await?;

        serde_json::from_str(&body).map_err(|source| AnnotatorError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
