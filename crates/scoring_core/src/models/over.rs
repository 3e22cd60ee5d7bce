//! Over notation ("overs.balls").
//!
//! `12.3` reads "twelve completed overs and three legal balls into the
//! thirteenth". It is a mixed-radix-6 count that only looks like a decimal,
//! so it never takes part in arithmetic: every value is projected from a raw
//! legal-ball count with [`OverCounter::encode`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Legal balls in one over.
pub const BALLS_PER_OVER: u32 = 6;

/// Display value of a legal-ball count. Deliberately has no arithmetic impls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OverNotation {
    completed: u32,
    balls: u8,
}

impl OverNotation {
    pub const ZERO: OverNotation = OverNotation { completed: 0, balls: 0 };

    /// Build from parts. `balls` must be 0..=5.
    pub fn new(completed: u32, balls: u8) -> Option<Self> {
        if u32::from(balls) < BALLS_PER_OVER {
            Some(Self { completed, balls })
        } else {
            None
        }
    }

    /// Completed overs.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Legal balls bowled in the current over (0..=5).
    pub fn balls(&self) -> u8 {
        self.balls
    }
}

impl fmt::Display for OverNotation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.completed, self.balls)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOverError(String);

impl fmt::Display for ParseOverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid over notation '{}'", self.0)
    }
}

impl std::error::Error for ParseOverError {}

impl FromStr for OverNotation {
    type Err = ParseOverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseOverError(s.to_string());
        let (completed, balls) = match s.split_once('.') {
            Some((c, b)) => (c, b),
            None => (s, "0"),
        };
        // Single fractional digit only: "1.10" is not "1 over 10 balls".
        if balls.len() != 1 {
            return Err(err());
        }
        let completed: u32 = completed.parse().map_err(|_| err())?;
        let balls: u8 = balls.parse().map_err(|_| err())?;
        OverNotation::new(completed, balls).ok_or_else(err)
    }
}

impl Serialize for OverNotation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OverNotation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Encode/decode between raw legal-ball counts and over notation.
pub struct OverCounter;

impl OverCounter {
    pub fn encode(legal_balls: u32) -> OverNotation {
        OverNotation {
            completed: legal_balls / BALLS_PER_OVER,
            // remainder < 6 always fits
            balls: (legal_balls % BALLS_PER_OVER) as u8,
        }
    }

    pub fn decode(notation: OverNotation) -> u32 {
        notation.completed * BALLS_PER_OVER + u32::from(notation.balls)
    }
}
