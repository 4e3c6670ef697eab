use std::io;
use thiserror::Error;

/// Errors raised by attendance operations
#[derive(Debug, Error)]
pub enum AttendError {
    #[error("Incorrect PIN! Try Course Rep Matric.")]
    IncorrectPin,

    #[error("Please fill in Course Code and Level.")]
    IncompleteSetup,

    #[error("Not logged in. Run `attendscan login` first.")]
    NotAuthenticated,

    #[error("No active session. Complete the class setup first.")]
    SessionInactive,

    #[error("Duplicate matric number in roster seed: {0}")]
    DuplicateMatric(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Scanner error: {0}")]
    Scanner(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AttendError>;
