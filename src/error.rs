//! Errors shared by the voting operations.
//!
//! Validation failures are detected locally and handed back to the caller,
//! which decides how to present them. Nothing here is retried.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required fields")]
    MissingFields,
    #[error("you must select three different categories")]
    DuplicateCategorySelection,
    #[error("you have already voted")]
    AlreadyVoted,
    #[error("database error: {0}")]
    Persistence(#[from] diesel::result::Error),
    #[error("you are not allowed to do this")]
    Unauthorized,
    #[error("not found")]
    NotFound,
}

impl Error {
    /// Whether the error came from checking the caller's input, as opposed to
    /// the store or the caller's identity.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingFields
                | Error::DuplicateCategorySelection
                | Error::AlreadyVoted
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
