//! The module contains the errors the engine can throw.
//!
//! Every failure is recoverable at the conversation level: validation
//! failures re-prompt the same step, [`NotFound`] surfaces as a user
//! message, and collaborator failures ([`Database`], [`Dispatch`]) tell
//! the user to retry later.
//!
//! [`NotFound`]: EngineError::NotFound
//! [`Database`]: EngineError::Database
//! [`Dispatch`]: EngineError::Dispatch
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("split out of range: {0}")]
    SplitOutOfRange(String),
    #[error("\"{0}\" not found")]
    NotFound(String),
    #[error("reminder dispatch failed: {0}")]
    Dispatch(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::SplitOutOfRange(a), Self::SplitOutOfRange(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Dispatch(a), Self::Dispatch(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
