//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when an entry, account, link type or group does
//!   not exist.
//! - [`ExistingKey`] thrown when a unique business key (account number) is
//!   already taken.
//! - [`InvalidInput`] thrown when a command carries values the engine refuses
//!   (negative durations, empty account numbers, linking an entry to itself).
//! - [`InvalidSnapshot`] thrown when an undo log row cannot be decoded.
//! - [`Conflict`] thrown when a catalog row is still referenced.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`InvalidSnapshot`]: EngineError::InvalidSnapshot
//!  [`Conflict`]: EngineError::Conflict
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidSnapshot(a), Self::InvalidSnapshot(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
