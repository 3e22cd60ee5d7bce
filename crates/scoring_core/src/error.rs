use std::fmt;

use thiserror::Error;

use crate::models::PlayerId;

/// Which nomination slot is empty when a delivery is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Striker,
    NonStriker,
    Bowler,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Role::Striker => write!(f, "striker"),
            Role::NonStriker => write!(f, "non-striker"),
            Role::Bowler => write!(f, "bowler"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("No {role} selected")]
    MissingNomination { role: Role },

    #[error("No deliveries recorded")]
    EmptyLog,

    #[error("Invalid outcome: {0}")]
    InvalidOutcome(String),

    #[error("Unknown player: {id}")]
    UnknownPlayer { id: PlayerId },

    #[error("Invalid nomination: {0}")]
    InvalidNomination(String),

    #[error("Inconsistent innings state: {0}")]
    InconsistentState(String),

    #[error("Stale state version: expected {expected}, current {actual}")]
    StaleVersion { expected: u64, actual: u64 },
}

impl ScoringError {
    /// Errors the operator resolves at the console (nominate, reload, fix the input).
    /// Anything else means the innings snapshot itself is damaged.
    pub fn is_operator_error(&self) -> bool {
        match self {
            ScoringError::MissingNomination { .. } => true,
            ScoringError::EmptyLog => true,
            ScoringError::InvalidOutcome(_) => true,
            ScoringError::InvalidNomination(_) => true,
            ScoringError::StaleVersion { .. } => true,
            ScoringError::UnknownPlayer { .. } => false,
            ScoringError::InconsistentState(_) => false,
        }
    }

    /// Stable machine-readable code used by the JSON boundary.
    pub fn code(&self) -> &'static str {
        match self {
            ScoringError::MissingNomination { .. } => "MISSING_NOMINATION",
            ScoringError::EmptyLog => "EMPTY_LOG",
            ScoringError::InvalidOutcome(_) => "INVALID_OUTCOME",
            ScoringError::UnknownPlayer { .. } => "UNKNOWN_PLAYER",
            ScoringError::InvalidNomination(_) => "INVALID_NOMINATION",
            ScoringError::InconsistentState(_) => "INCONSISTENT_STATE",
            ScoringError::StaleVersion { .. } => "STALE_VERSION",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoringError>;
