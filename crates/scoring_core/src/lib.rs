//! # scoring_core - Ball-by-Ball Cricket Scoring Engine
//!
//! Turns one delivery at a time into an innings state, and can withdraw the
//! last delivery exactly.
//!
//! ## Features
//! - Pure forward/reverse transitions: `revert(apply(s, o)) == s`
//! - Over notation always derived from raw legal-ball counts
//! - Versioned sessions so concurrent operators cannot lose updates
//! - Compressed, checksummed innings snapshots
//! - JSON API for controllers that keep state as documents

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod save;
pub mod scorecard;
pub mod session;

pub use api::{apply_ball_json, revert_json, scorecard_json};
pub use config::{ConfigError, ScoringConfig};
pub use engine::{ScoringEngine, UndoEngine};
pub use error::{Result, Role, ScoringError};
pub use models::{
    BallOutcome, BallRecord, BattingEntry, BowlingEntry, Extras, InningsState, OverCounter,
    OverNotation, PlayerId, Selection,
};
pub use save::{InningsSave, InningsStore, SaveError};
pub use scorecard::Scorecard;
pub use session::{ScoringSession, SessionRegistry, SESSIONS};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
