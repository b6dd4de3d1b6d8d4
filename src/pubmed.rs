//! PubMed XML extraction using quick-xml.
//!
//! Every `<Article>` element becomes one [`Document`] whose text is the
//! article title followed directly by its abstract.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;

use crate::models::Document;

/// Errors raised while reading a PubMed export.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Article {0} has no ArticleTitle")]
    MissingTitle(usize),
}

/// Read a PubMed XML file and extract one document per article.
pub fn extract_documents(path: &Path) -> Result<Vec<Document>, ExtractError> {
    let xml = std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_documents(&xml)
}

/// Extract one document per `<Article>` element from XML content.
pub fn parse_documents(xml: &str) -> Result<Vec<Document>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut documents = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"Article" => {
                let index = documents.len() + 1;
                let (title, abstract_text) = parse_article(&mut reader)?;
                let title = title.ok_or(ExtractError::MissingTitle(index))?;
                documents.push(Document::from_parts(
                    index,
                    &title,
                    abstract_text.as_deref(),
                ));
            }
            Event::Empty(e) if e.name().as_ref() == b"Article" => {
                return Err(ExtractError::MissingTitle(documents.len() + 1));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!("Extracted {} articles", documents.len());
    Ok(documents)
}

/// Returns (title, abstract) of the current `<Article>`.
fn parse_article(
    reader: &mut Reader<&[u8]>,
) -> Result<(Option<String>, Option<String>), ExtractError> {
    let mut title = None;
    let mut abstract_text = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"ArticleTitle" => {
                    title = Some(read_text_content(reader, b"ArticleTitle")?);
                }
                b"Abstract" => abstract_text = Some(parse_abstract(reader)?),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"ArticleTitle" => title = Some(String::new()),
                b"Abstract" => abstract_text = Some(String::new()),
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"Article" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((title, abstract_text))
}

/// Structured abstracts carry several `AbstractText` sections; they are
/// joined with a single space.
fn parse_abstract(reader: &mut Reader<&[u8]>) -> Result<String, ExtractError> {
    let mut buf = Vec::new();
    let mut sections = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"AbstractText" => {
                sections.push(read_text_content(reader, b"AbstractText")?);
            }
            Event::End(e) if e.name().as_ref() == b"Abstract" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sections.join(" "))
}

/// Read the text of an element, including the text of nested inline markup.
fn read_text_content(reader: &mut Reader<&[u8]>, end_tag: &[u8]) -> Result<String, ExtractError> {
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Start(_) => depth += 1,
            Event::End(e) => {
                depth -= 1;
                if depth == 0 && e.name().as_ref() == end_tag {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text.trim().to_string())
}
