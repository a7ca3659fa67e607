//! The module contains the errors the engine can return.
//!
//! Errors fall in four families:
//!
//! - validation: [`InvalidAmount`], [`InvalidKind`], [`InvalidDate`],
//!   [`InvalidRange`], [`InvalidName`], [`InvalidOwner`], [`InvalidCurrency`].
//!   The caller must correct the input; never retried.
//! - [`KeyNotFound`] when a referenced item does not exist for the owner.
//! - [`ExistingKey`] when a uniquely keyed item already exists.
//! - [`Database`] when the store fails. Only these are retried, and a
//!   reported `Database` error means nothing was committed.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidKind`]: EngineError::InvalidKind
//!  [`InvalidDate`]: EngineError::InvalidDate
//!  [`InvalidRange`]: EngineError::InvalidRange
//!  [`InvalidName`]: EngineError::InvalidName
//!  [`InvalidOwner`]: EngineError::InvalidOwner
//!  [`InvalidCurrency`]: EngineError::InvalidCurrency
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid kind: {0}")]
    InvalidKind(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid owner: {0}")]
    InvalidOwner(String),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for malformed or out-of-domain input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::InvalidKind(_)
                | Self::InvalidDate(_)
                | Self::InvalidRange(_)
                | Self::InvalidName(_)
                | Self::InvalidOwner(_)
                | Self::InvalidCurrency(_)
        )
    }

    /// Returns `true` when the whole unit of work may be safely re-run.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidKind(a), Self::InvalidKind(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::InvalidRange(a), Self::InvalidRange(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidOwner(a), Self::InvalidOwner(b)) => a == b,
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_database_errors_are_retryable() {
        assert!(EngineError::Database(DbErr::Custom("boom".to_string())).is_retryable());
        assert!(!EngineError::KeyNotFound("category".to_string()).is_retryable());
        assert!(!EngineError::InvalidRange("range".to_string()).is_retryable());
    }

    #[test]
    fn validation_family() {
        assert!(EngineError::InvalidAmount("x".to_string()).is_validation());
        assert!(EngineError::InvalidCurrency("x".to_string()).is_validation());
        assert!(!EngineError::ExistingKey("x".to_string()).is_validation());
        assert!(!EngineError::Database(DbErr::Custom("x".to_string())).is_validation());
    }
}
