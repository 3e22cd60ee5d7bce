use serde::{Deserialize, Serialize};

use super::outcome::{BallOutcome, DeliveryFlags};
use super::over::BALLS_PER_OVER;
use super::PlayerId;

/// One logged delivery. Never edited after it is appended to the innings log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallRecord {
    /// Ball of the over this delivery belongs to (1..=6). A wide or no-ball
    /// carries the number of the legal ball still to come.
    pub ball: u8,
    /// 0-based over index.
    pub over: u32,
    pub bowler_id: PlayerId,
    pub striker_id: PlayerId,
    pub runs_off_bat: u32,
    pub is_wide: bool,
    pub is_no_ball: bool,
    pub is_bye: bool,
    pub is_leg_bye: bool,
    pub is_wicket: bool,
    /// Penalty extras on this delivery: 1 for a wide or no-ball.
    pub extras: u32,
}

impl BallRecord {
    pub(crate) fn from_outcome(
        outcome: &BallOutcome,
        ball: u8,
        over: u32,
        bowler_id: PlayerId,
        striker_id: PlayerId,
    ) -> Self {
        Self {
            ball,
            over,
            bowler_id,
            striker_id,
            runs_off_bat: outcome.runs_off_bat,
            is_wide: outcome.is_wide,
            is_no_ball: outcome.is_no_ball,
            is_bye: outcome.is_bye,
            is_leg_bye: outcome.is_leg_bye,
            is_wicket: outcome.is_wicket,
            extras: outcome.penalty(),
        }
    }

    pub fn is_legal(&self) -> bool {
        DeliveryFlags::is_legal(self)
    }

    /// True when this delivery was the sixth legal ball of its over.
    pub fn ends_over(&self) -> bool {
        self.is_legal() && u32::from(self.ball) == BALLS_PER_OVER
    }

    /// Short scoreboard token: "4", "W", "Wd", "2Nb", "1Lb", "3B".
    pub fn display_token(&self) -> String {
        let mut token = if self.is_wide {
            match self.runs_off_bat {
                0 => "Wd".to_string(),
                n => format!("{}Wd", n + 1),
            }
        } else if self.is_no_ball {
            match self.runs_off_bat {
                0 => "Nb".to_string(),
                n => format!("{n}Nb"),
            }
        } else if self.is_bye {
            format!("{}B", self.runs_off_bat)
        } else if self.is_leg_bye {
            format!("{}Lb", self.runs_off_bat)
        } else {
            self.runs_off_bat.to_string()
        };

        if self.is_wicket {
            token = if token == "0" { "W".to_string() } else { format!("{token}+W") };
        }
        token
    }
}

impl DeliveryFlags for BallRecord {
    fn runs_off_bat(&self) -> u32 {
        self.runs_off_bat
    }
    fn is_wide(&self) -> bool {
        self.is_wide
    }
    fn is_no_ball(&self) -> bool {
        self.is_no_ball
    }
    fn is_bye(&self) -> bool {
        self.is_bye
    }
    fn is_leg_bye(&self) -> bool {
        self.is_leg_bye
    }
}
