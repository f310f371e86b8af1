// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

//! EML Signals
//!
//! Tolerant email ingestion and heuristic feature extraction for phishing
//! datasets. Raw messages become normalized records, and each record yields a
//! header feature set and a body feature set with a fixed schema.
//!
//! # Features
//!
//! - Ingestion that never fails on malformed or mis-encoded messages
//! - Charset fallback chain and HTML-to-text normalization
//! - Content-addressed attachments (SHA-256)
//! - Authenticity, sender, temporal and relay-path header signals
//! - Urgency, authority, threat, request and money language in bodies
//! - Three-tier URL extraction with link risk flags
//! - JSON-lines batch pipeline
//!
//! # Example
//!
//! ```rust
//! use eml_signals::{extract_body_features, extract_header_features, parse_eml};
//!
//! let raw = b"From: Alice <alice@example.com>\r\nSubject: Hello\r\n\r\nURGENT: verify your account at www.example.com!";
//! let record = parse_eml(raw, "hello.eml");
//!
//! let body = extract_body_features(&record);
//! assert!(body.urgency.has_urgency);
//! assert_eq!(body.urls, vec!["www.example.com"]);
//!
//! let headers = extract_header_features(&record);
//! assert!(!headers.sender.display_name_empty);
//! assert_eq!(headers.temporal.day_of_week, -1);
//! ```

pub mod body;
pub mod config;
pub mod date;
pub mod decode;
mod error;
pub mod extracted;
pub mod headers;
pub mod html;
pub mod lexicon;
pub mod parser;
pub mod pipeline;
pub mod types;

pub use body::{BodyFeatures, extract_body_features};
pub use error::{PipelineError, Result};
pub use extracted::extract_urls;
pub use headers::{HeaderFeatures, extract_header_features};
pub use parser::{parse_eml, parse_eml_file};
pub use types::{Attachment, HeaderMap, Mailbox, Record};
