use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Exhausted: {0}")]
    Exhausted(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }

    /// Whether this error is likely transient (e.g. DB connection lost or
    /// a serialization failure) and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        match self {
            DomainError::Storage(msg) => {
                let msg = msg.to_ascii_lowercase();
                msg.contains("locked")
                    || msg.contains("busy")
                    || msg.contains("could not serialize")
                    || msg.contains("deadlock")
                    || msg.contains("connection")
                    || msg.contains("timed out")
            }
            _ => false,
        }
    }

    /// Machine readable error code, surfaced to API clients next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => "NotFound",
            DomainError::Validation(_) => "ValidationError",
            DomainError::Conflict(_) => "Conflict",
            DomainError::InvalidState(_) => "InvalidState",
            DomainError::Unauthorized(_) => "Unauthorized",
            DomainError::Exhausted(_) => "Exhausted",
            DomainError::Storage(_) => "StorageError",
        }
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Storage(e.to_string())
    }
}

// ── Tests ──────────────────────────────────────────────────────
