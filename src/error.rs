//! Error types for the simdyna crate

use thiserror::Error;

use crate::identifiers::{CardId, Seat};

/// Main error type for the simdyna crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("unknown card {card} in {context}")]
    UnknownCard { card: CardId, context: String },

    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("missing field '{field}' for {kind} encoding")]
    MissingField { field: String, kind: String },

    #[error("seat {seat} has no legal actions on turn {turn}")]
    NoLegalActions { seat: Seat, turn: u32 },

    #[error("store unavailable while trying to {operation}: {source}")]
    StoreUnavailable {
        operation: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("corrupt {table} record {id}: {message}")]
    CorruptRecord {
        table: String,
        id: i64,
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("agent is {actual}, expected {expected}")]
    InvalidAgentPhase { expected: String, actual: String },

    #[error("seat {seat} attempted illegal action {action}")]
    IllegalAction { seat: Seat, action: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

impl Error {
    /// True for the malformed-input family (`EncodingError` in the taxonomy).
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            Error::UnknownCard { .. } | Error::InvalidField { .. } | Error::MissingField { .. }
        )
    }

    pub(crate) fn store(operation: impl Into<String>) -> impl FnOnce(rusqlite::Error) -> Error {
        let operation = operation.into();
        move |source| Error::StoreUnavailable { operation, source }
    }
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
