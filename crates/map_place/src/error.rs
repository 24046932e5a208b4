//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid tile-set configuration, out-of-range grid access, per-rule placement failures
//! (no candidates, bad direction, unknown item), command translation failures and
//! solver contract violations.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown category '{name}'")]
    UnknownCategory { name: String },

    #[error("coordinate ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },

    #[error("no valid positions found for rule '{rule}'")]
    NoCandidates { rule: String },

    #[error("invalid direction '{token}' (expected left, right, up or down)")]
    InvalidDirection { token: String },

    #[error("item '{name}' not found in the item catalog")]
    UnknownItem { name: String },

    #[error("could not interpret command: {0}")]
    Translation(String),

    #[error("solver error: {0}")]
    Solver(String),
}

impl Error {
    /// Returns `true` for errors that only affect a single placement request.
    ///
    /// Configuration and solver errors are fatal to the classification or
    /// enumeration pass that raised them; everything else is scoped to one rule
    /// invocation and a regeneration continues with the next step.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::NoCandidates { .. }
                | Error::InvalidDirection { .. }
                | Error::UnknownItem { .. }
                | Error::UnknownCategory { .. }
                | Error::Translation(_)
        )
    }
}
