use std::fmt;
use async_trait::async_trait;
use crate::core::library::LibraryError;

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    DuplicateKey {
        message: String,
    },
    NotFound {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Serialization {
        message: String,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    Cancelled {
        message: String,
    },
}

impl CommandError {
    // errors caused by the caller's input rather than the store
    pub fn is_client_error(&self) -> bool {
        matches!(self, CommandError::Validation { .. } | CommandError::NotFound { .. } |
            CommandError::DuplicateKey { .. } | CommandError::Serialization { .. })
    }

    pub fn retryable(&self) -> bool {
        match self {
            CommandError::Database { retryable, .. } => { *retryable }
            CommandError::Runtime { retryable, .. } => { *retryable }
            _ => { false }
        }
    }
}

#[async_trait]
pub trait Command<Request, Response> {
    async fn execute(&self, req: Request) -> Result<Response, CommandError>;
}

impl From<LibraryError> for CommandError {
    fn from(other: LibraryError) -> Self {
        match other {
            LibraryError::Database { message, reason_code, retryable } => {
                CommandError::Database { message, reason_code, retryable }
            }
            LibraryError::Conflict { message } => {
                CommandError::DuplicateKey { message }
            }
            LibraryError::NotFound { message } => {
                CommandError::NotFound { message }
            }
            LibraryError::CurrentlyUnavailable { message, reason_code, retryable } => {
                CommandError::Runtime { message, reason_code, retryable }
            }
            LibraryError::InvalidArgument { message, reason_code } => {
                CommandError::Validation { message, reason_code }
            }
            LibraryError::Serialization { message } => {
                CommandError::Serialization { message }
            }
            LibraryError::Cancelled { message } => {
                CommandError::Cancelled { message }
            }
            LibraryError::Runtime { message, reason_code } => {
                CommandError::Runtime { message, reason_code, retryable: true }
            }
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CommandError::Database { message, .. } => { write!(f, "database error {}", message) }
            CommandError::DuplicateKey { message } => { write!(f, "duplicate key {}", message) }
            CommandError::NotFound { message } => { write!(f, "not found {}", message) }
            CommandError::Runtime { message, .. } => { write!(f, "runtime error {}", message) }
            CommandError::Serialization { message } => { write!(f, "serialization error {}", message) }
            CommandError::Validation { message, .. } => { write!(f, "validation error {}", message) }
            CommandError::Cancelled { message } => { write!(f, "cancelled {}", message) }
        }
    }
}

impl std::error::Error for CommandError {}
