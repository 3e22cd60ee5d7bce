use serde::{Deserialize, Serialize};

use super::over::{OverCounter, OverNotation};
use super::PlayerId;

/// Batting figures for one player in this innings. Kept after dismissal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattingEntry {
    pub id: PlayerId,
    pub name: String,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub is_striker: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_by: Option<String>,
}

impl BattingEntry {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            runs: 0,
            balls: 0,
            fours: 0,
            sixes: 0,
            is_striker: false,
            out_by: None,
        }
    }

    /// Runs per 100 balls faced.
    pub fn strike_rate(&self) -> f64 {
        if self.balls == 0 {
            0.0
        } else {
            f64::from(self.runs) * 100.0 / f64::from(self.balls)
        }
    }
}

/// Bowling figures for one player in this innings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlingEntry {
    pub id: PlayerId,
    pub name: String,
    /// Display projection of `balls_bowled`.
    pub overs: OverNotation,
    /// Legal balls bowled; the authoritative counter.
    #[serde(default)]
    pub balls_bowled: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub maidens: u32,
}

impl BowlingEntry {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            overs: OverNotation::ZERO,
            balls_bowled: 0,
            runs_conceded: 0,
            wickets: 0,
            maidens: 0,
        }
    }

    /// Set the raw counter and re-project `overs` from it.
    pub(crate) fn set_balls_bowled(&mut self, balls: u32) {
        self.balls_bowled = balls;
        self.overs = OverCounter::encode(balls);
    }

    /// Runs conceded per six legal balls.
    pub fn economy(&self) -> f64 {
        if self.balls_bowled == 0 {
            0.0
        } else {
            f64::from(self.runs_conceded) * 6.0 / f64::from(self.balls_bowled)
        }
    }
}
