//! Error types for the onboarding profile step.

use serde::Serialize;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Edit rejected: {0}")]
    Edit(#[from] EditError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Structured detail attached to a failed remote read or write.
///
/// Mirrors what hosted data stores report: a human message plus optional
/// machine code, extra detail and a hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub code: Option<String>,
    pub detail: Option<String>,
    pub hint: Option<String>,
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error reported by a remote store that already carries structured detail.
    #[error("Remote store error: {message}")]
    Remote {
        message: String,
        code: Option<String>,
        detail: Option<String>,
        hint: Option<String>,
    },
}

impl DatabaseError {
    /// Flatten into the `{message, code, detail, hint}` shape used in logs.
    pub fn detail(&self) -> ErrorDetail {
        let (code, hint) = match self {
            Self::Pool(_) => ("pool", Some("check that the database file is reachable")),
            Self::Query(_) => ("query", None),
            Self::Constraint(_) => ("constraint", Some("a unique or foreign key rule was violated")),
            Self::Migration(_) => ("migration", None),
            Self::Serialization(_) => ("serialization", None),
            Self::Remote {
                message,
                code,
                detail,
                hint,
            } => {
                return ErrorDetail {
                    message: message.clone(),
                    code: code.clone(),
                    detail: detail.clone(),
                    hint: hint.clone(),
                };
            }
        };
        ErrorDetail {
            message: self.to_string(),
            code: Some(code.to_string()),
            detail: None,
            hint: hint.map(String::from),
        }
    }
}

/// Identity provider errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Identity lookup failed: {0}")]
    Lookup(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Rejected field edits and file selections.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditError {
    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    #[error("File {file_name} is not an image (got {mime_type})")]
    NotAnImage { file_name: String, mime_type: String },

    #[error("File {file_name} is {size} bytes, larger than the {max} byte limit")]
    FileTooLarge {
        file_name: String,
        size: usize,
        max: usize,
    },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
