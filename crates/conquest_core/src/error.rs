//! # Parse Errors
//!
//! Result-style parsing for the string vocabularies that arrive from clients.
//! Callers filter `Err` values out instead of failing the whole message.

use thiserror::Error;

/// A client-supplied name did not match any known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown discrete input action.
    #[error("unknown input action: {0:?}")]
    UnknownAction(String),

    /// Unknown item type.
    #[error("unknown item type: {0:?}")]
    UnknownItemType(String),
}
