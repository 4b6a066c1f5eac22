//! Error types scoped to a single indicator pass.
//!
//! Nothing here is fatal for the pipeline as a whole: the orchestrator turns any
//! of these into an empty chart for the affected indicator.

use thiserror::Error;

/// Why a request for one indicator produced no records.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, TLS, read).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Server answered with a non-2xx status.
    #[error("request failed with HTTP {0}")]
    Status(u16),
    /// Body was not valid JSON.
    #[error("decode json: {0}")]
    Decode(#[from] serde_json::Error),
    /// The API reported an error payload in position 0.
    #[error("world bank api error: {0}")]
    Api(String),
    /// JSON was valid but not a `[meta, [records...]]` envelope.
    #[error("unexpected response shape: {0}")]
    Envelope(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None => FetchError::Network(Box::new(e)),
        }
    }
}

/// Failures while flattening records or loading them into a table.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    /// A record lacks a nested object (or its `value`) needed for flattening.
    #[error("record {index} is missing field `{field}`")]
    FieldMissing { index: usize, field: &'static str },
    /// A record is a JSON array, string, number, bool or null instead of an object.
    #[error("record {index} is not an object: {found}")]
    NotAnObject { index: usize, found: &'static str },
    /// Column count does not match the expected table shape.
    #[error("expected {expected} columns, found {found}")]
    ShapeMismatch { expected: usize, found: usize },
    /// A cell holds a value that cannot be read as the column's type.
    #[error("row {index}: column `{column}` has unusable value {value}")]
    InvalidField {
        index: usize,
        column: String,
        value: String,
    },
}

/// Per-indicator outcome error, as seen by the orchestrator.
#[derive(Debug, Error)]
pub enum FigureError {
    #[error("could not load data for {indicator}: {source}")]
    FetchFailed {
        indicator: &'static str,
        #[source]
        source: FetchError,
    },
    #[error(transparent)]
    Table(#[from] TableError),
}
