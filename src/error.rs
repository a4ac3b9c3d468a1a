//! Error types for the embedding pipeline and its file handling.

use thiserror::Error;

/// Errors raised by the numerical pipeline and the query engine.
///
/// Every stage surfaces its error to the caller immediately, there is no
/// local recovery.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EmbeddingError {
    /// Malformed input matrix or mismatched dimensions.
    #[error("shape error: {0}")]
    Shape(String),

    /// The decomposition failed or the requested rank is not available.
    #[error("decomposition failed: {0}")]
    Convergence(String),

    /// A normalization target has (near) zero norm.
    #[error("cannot normalize {what}: norm {norm:e} is below tolerance")]
    DegenerateVector {
        /// Which vector was being normalized
        what: String,
        /// The offending norm
        norm: f64,
    },

    /// A word is missing from the vocabulary.
    #[error("word '{0}' is not in the vocabulary")]
    WordNotFound(String),

    /// A count request outside the allowed range.
    #[error("invalid k = {k}, allowed range is {min}..={max}")]
    InvalidK { k: usize, min: usize, max: usize },

    /// An analogy batch without queries.
    #[error("analogy batch is empty")]
    EmptyBatch,
}

impl EmbeddingError {
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }

    pub fn convergence(message: impl Into<String>) -> Self {
        Self::Convergence(message.into())
    }

    pub fn degenerate(what: impl Into<String>, norm: f64) -> Self {
        Self::DegenerateVector {
            what: what.into(),
            norm,
        }
    }

    pub fn word_not_found(word: impl Into<String>) -> Self {
        Self::WordNotFound(word.into())
    }
}

/// Errors raised while reading inputs or writing artifacts.
#[derive(Debug, Error)]
pub enum FilesError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("npy read error: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    #[error("npy write error: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("{path}:{line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

impl FilesError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}
