// src/error.rs
//
// Load-time error types. Lookups and text rewrites never fail at runtime;
// only reading a glossary or a settings file can.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a glossary document is rejected before it reaches the engine
#[derive(Debug, Error)]
pub enum GlossaryError {
    #[error("failed to read glossary file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("glossary is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("term '{term}' is listed under '{listed_under}' but declares category '{declared}'")]
    CategoryMismatch {
        term: String,
        listed_under: String,
        declared: String,
    },

    #[error("term '{term}' has an empty '{field}' field")]
    EmptyField { term: String, field: &'static str },

    #[error("term '{term}' appears in both '{first}' and '{second}'")]
    DuplicateTerm {
        term: String,
        first: String,
        second: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to access config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}
