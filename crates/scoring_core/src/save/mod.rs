// Innings snapshots on disk.
// MessagePack + LZ4 compression with versioning and integrity checks

pub mod error;
pub mod format;
pub mod migration;
pub mod store;

pub use error::SaveError;
pub use format::{decompress_and_deserialize, serialize_and_compress, InningsSave};
pub use migration::migrate_save;
pub use store::{InningsStore, SavedInningsInfo};

pub const SAVE_VERSION: u32 = 1;
