//! annotarff - annotate PubMed abstracts and export ontology terms as ARFF.
//!
//! Reads a PubMed XML export, sends each article's title and abstract to the
//! BioPortal annotator, and writes a document × term membership matrix in
//! the Attribute-Relation File Format.

pub mod annotator;
pub mod arff;
pub mod cli;
pub mod config;
pub mod models;
pub mod pubmed;
pub mod services;
pub mod vocabulary;
