//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// missing references, stock shortfalls). Infrastructure faults are carried as
/// `Storage` after partial state has been rolled back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value or request failed validation (e.g. empty item list, bad quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced resource does not exist; the message names the missing id.
    #[error("not found: {0}")]
    NotFound(String),

    /// Requested quantity exceeds available stock for a target.
    #[error("insufficient stock for {target}: requested {requested}, available {available}")]
    InsufficientStock {
        target: String,
        requested: i64,
        available: i64,
    },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Persistence-layer failure, surfaced after rollback of partial state.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn insufficient_stock(
        target: impl Into<String>,
        requested: i64,
        available: i64,
    ) -> Self {
        Self::InsufficientStock {
            target: target.into(),
            requested,
            available,
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
