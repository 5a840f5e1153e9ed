use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the core engine (segment building, merging, encoding,
/// and query evaluation). `TermNotFound` is deliberately absent: a lexicon
/// miss is represented as `Option::None` at the call site, not an error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to read input corpus at {path}: {source}")]
    InputIoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output file {path}: {source}")]
    OutputIoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed corpus line at byte offset {offset} in {path}: {reason}")]
    MalformedLine {
        path: PathBuf,
        offset: u64,
        reason: String,
    },

    #[error("invalid query input: {reason}")]
    InvalidQueryInput { reason: String },

    #[error("corrupt index: {reason}")]
    CorruptIndex { reason: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
