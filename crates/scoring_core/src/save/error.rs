use thiserror::Error;

use crate::error::ScoringError;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),

    #[error("Decompression error")]
    Decompression,

    #[error("Corrupted data")]
    Corrupted,

    #[error("Version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("Innings not found: {innings_id}")]
    NotFound { innings_id: String },

    #[error("Invalid innings id: {innings_id:?}")]
    InvalidId { innings_id: String },

    #[error("Innings already exists: {innings_id}")]
    AlreadyExists { innings_id: String },

    #[error("Innings changed since it was loaded: expected version {expected}, found {actual}")]
    StaleVersion { expected: u64, actual: u64 },

    #[error("Invalid innings state: {0}")]
    InvalidState(#[from] ScoringError),
}

impl SaveError {
    /// Whether running the same command again can succeed: reload after
    /// a concurrent write, or retry after a transient I/O failure.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SaveError::Io(_) => true,
            SaveError::NotFound { .. } => true,
            SaveError::StaleVersion { .. } => true,
            SaveError::AlreadyExists { .. } => false,
            SaveError::InvalidId { .. } => false,
            SaveError::Serialization(_) => false,
            SaveError::Deserialization(_) => false,
            SaveError::Decompression => false,
            SaveError::Corrupted => false,
            SaveError::ChecksumMismatch => false,
            SaveError::InvalidState(_) => false,
            SaveError::VersionMismatch { .. } => false,
        }
    }
}
