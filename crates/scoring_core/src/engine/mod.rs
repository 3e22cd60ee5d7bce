//! # Scoring Engine
//!
//! Forward ([`ScoringEngine::apply`]) and reverse ([`UndoEngine::revert`])
//! transitions over an [`InningsState`](crate::models::InningsState).
//!
//! Both are synchronous and pure: they take the current state by reference
//! and return a new one, so an error never leaves a half-scored innings
//! behind. Callers must serialize calls per innings; see
//! [`crate::session::ScoringSession`].

pub mod scoring;
pub(crate) mod strike;
pub mod undo;

#[cfg(test)]
pub(crate) mod test_fixtures;

#[cfg(test)]
mod proptests;

pub use scoring::ScoringEngine;
pub use undo::UndoEngine;
