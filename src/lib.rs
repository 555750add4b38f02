//! # docval-client Library
//!
//! Client side of a document validation service: safely parses untrusted
//! XML business documents, unwraps SBDH envelopes, derives the keyword that
//! classifies a document, and submits it to the service for validation.

pub mod cli;
pub mod config;
pub mod envelope;
pub mod error;
pub mod error_reporter;
pub mod http_client;
pub mod keyword;
pub mod logging;
pub mod output;
pub mod result;
pub mod xml;

pub use cli::{Cli, VerbosityLevel};
pub use config::{Config, ConfigManager};
pub use error::{ConfigError, DocValError, Result};
pub use error_reporter::ErrorReporter;
pub use http_client::{
    HttpClientConfig, KeywordSource, ValidationClient, ValidationRequest, DEFAULT_HOST,
    DEFAULT_PORT,
};
pub use keyword::{Keyword, derive, derive_from_bytes};
pub use output::Output;
pub use result::{Issue, ValidationResult};
pub use xml::{Element, QualifiedName, XmlDocument, parse};
