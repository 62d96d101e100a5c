use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// type alias for all operations on a [`BookEngine`] that could fail with a [`BookError`]
///
/// [`BookEngine`]: ./engine/trait.BookEngine.html
pub type Result<T> = std::result::Result<T, BookError>;

/// The error variants used by the book store, the server and the client.
#[derive(Error, Debug)]
pub enum BookError {
    /// an operation referenced an `id` that has no matching book
    #[error("{op}: book with id {id} was not found")]
    NotFound {
        /// the operation that was being performed
        op: &'static str,
        /// the id that could not be found
        id: u64,
    },

    /// a candidate book failed one of the validation rules
    #[error("invalid book record, field `{field}` {reason}")]
    InvalidRecord {
        /// name of the first field that failed validation
        field: &'static str,
        /// what was wrong with the field
        reason: String,
    },

    /// the largest id in the backing file is `u64::MAX`, no new id can be assigned
    #[error("no book id is left after {max}")]
    IdsExhausted {
        /// the largest id found in the backing file
        max: u64,
    },

    /// the backing file could not be read or written
    #[error("storage error while trying to {op} {path:?}: {source}")]
    Storage {
        /// the storage operation, "read", "write" or "create"
        op: &'static str,
        /// the backing file
        path: PathBuf,
        /// the underlying IO error
        #[source]
        source: io::Error,
    },

    /// variant for IO errors outside of the backing file, i.e. networking
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Serde Error
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// a command line argument or network address could not be parsed
    #[error("{0}")]
    Parsing(String),

    /// an error response that was sent back by a [`BookServer`]
    ///
    /// [`BookServer`]: ./struct.BookServer.html
    #[error("{message} ({status:?})")]
    Remote {
        /// the status the server attached to the error
        status: Status,
        /// the server's description of the error
        message: String,
    },
}

impl BookError {
    /// maps this error to the [`Status`] a client will see
    pub fn status(&self) -> Status {
        match self {
            BookError::NotFound { .. } => Status::NotFound,
            BookError::InvalidRecord { .. } => Status::InvalidRecord,
            BookError::Storage { .. } | BookError::Io(_) | BookError::IdsExhausted { .. } => {
                Status::Storage
            }
            BookError::Serde(_) | BookError::Parsing(_) => Status::BadRequest,
            BookError::Remote { status, .. } => *status,
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        BookError::InvalidRecord {
            field,
            reason: reason.into(),
        }
    }
}

/// Client visible classification of an error, roughly the HTTP 404 / 400 / 500 family
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// no book has the requested id
    NotFound,
    /// the submitted book failed validation
    InvalidRecord,
    /// the request itself could not be understood
    BadRequest,
    /// the server could not read or write its backing file
    Storage,
}
