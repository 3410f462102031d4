use thiserror::Error;

use crate::session::Role;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Operation requires the {required} role")]
    Forbidden { required: Role },

    #[error("SQL query is required")]
    EmptyQuery,

    /// Message reported by the query executor, passed through unchanged.
    #[error("{0}")]
    Query(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PortalResult<T> = Result<T, PortalError>;
