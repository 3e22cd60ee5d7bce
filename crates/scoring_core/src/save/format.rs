use super::error::SaveError;
use super::SAVE_VERSION;
use crate::models::InningsState;
use serde::{Deserialize, Serialize};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

const CHECKSUM_LEN: usize = 32;

/// Persisted snapshot of one innings session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InningsSave {
    /// Save format version for migration
    pub version: u32,

    /// Save timestamp (unix milliseconds)
    pub timestamp: u64,

    pub innings_id: String,

    /// Session version the state was committed at; writers compare against it.
    pub session_version: u64,

    pub state: InningsState,
}

impl InningsSave {
    pub fn new(innings_id: String, session_version: u64, state: InningsState) -> Self {
        Self {
            version: SAVE_VERSION,
            timestamp: current_timestamp(),
            innings_id,
            session_version,
            state,
        }
    }

    pub fn update_timestamp(&mut self) {
        self.timestamp = current_timestamp();
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        if !is_valid_innings_id(&self.innings_id) {
            return Err(SaveError::InvalidId { innings_id: self.innings_id.clone() });
        }
        self.state.check_invariants()?;
        Ok(())
    }
}

/// Ids double as file names: ASCII letters, digits, '-' and '_' only.
pub fn is_valid_innings_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Serialize and compress an innings snapshot
pub fn serialize_and_compress(save: &InningsSave) -> Result<Vec<u8>, SaveError> {
    save.validate()?;

    // 1. MessagePack with field names
    let msgpack = to_vec_named(save)?;

    // 2. LZ4, size prepended
    let compressed = compress_prepend_size(&msgpack);

    // 3. SHA256 of the compressed payload, appended
    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);

    Ok(result)
}

/// Verify, decompress and deserialize an innings snapshot
pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<InningsSave, SaveError> {
    // size header + checksum
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(SaveError::Corrupted);
    }

    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - CHECKSUM_LEN);

    let mut hasher = Sha256::new();
    hasher.update(payload);
    let calculated_checksum = hasher.finalize();

    if &calculated_checksum[..] != checksum_bytes {
        return Err(SaveError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| SaveError::Decompression)?;

    let save: InningsSave = from_slice(&msgpack)?;

    if save.version > SAVE_VERSION {
        return Err(SaveError::VersionMismatch { found: save.version, expected: SAVE_VERSION });
    }

    Ok(save)
}

/// SHA256 of an encoded snapshot, hex encoded.
pub fn checksum_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub fn current_timestamp() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::{play, ready_innings};
    use crate::models::BallOutcome;

    fn sample() -> InningsSave {
        let state = play(
            ready_innings(),
            &[BallOutcome::runs(4), BallOutcome::wide(1), BallOutcome::wicket()],
        );
        InningsSave::new("semi-final_2".to_string(), 7, state)
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let save = sample();

        let serialized = serialize_and_compress(&save).unwrap();
        let deserialized = decompress_and_deserialize(&serialized).unwrap();

        assert_eq!(save, deserialized);
    }

    #[test]
    fn test_checksum_validation() {
        let mut serialized = serialize_and_compress(&sample()).unwrap();

        // Corrupt the checksum
        if let Some(last) = serialized.last_mut() {
            *last = last.wrapping_add(1);
        }

        let result = decompress_and_deserialize(&serialized);
        assert!(matches!(result, Err(SaveError::ChecksumMismatch)));
    }

    #[test]
    fn test_truncated_input_is_corrupted() {
        assert!(matches!(decompress_and_deserialize(&[0u8; 10]), Err(SaveError::Corrupted)));
    }

    #[test]
    fn test_future_version_rejected() {
        let mut save = sample();
        save.version = SAVE_VERSION + 1;
        let serialized = serialize_and_compress(&save).unwrap();
        assert!(matches!(
            decompress_and_deserialize(&serialized),
            Err(SaveError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_inconsistent_state_is_not_written() {
        let mut save = sample();
        save.state.total_runs += 1;
        assert!(matches!(serialize_and_compress(&save), Err(SaveError::InvalidState(_))));
    }

    #[test]
    fn test_innings_id_rules() {
        assert!(is_valid_innings_id("final-2024_inn1"));
        assert!(!is_valid_innings_id(""));
        assert!(!is_valid_innings_id("../escape"));
        assert!(!is_valid_innings_id("with space"));
    }
}
