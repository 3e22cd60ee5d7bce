//! Read-only scorecard projection of an innings, for viewers and overlays.

use serde::{Deserialize, Serialize};

use crate::models::{InningsState, OverNotation, PlayerId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    pub batting_team: String,
    pub bowling_team: String,
    /// "runs/wickets"
    pub score: String,
    pub overs: OverNotation,
    pub run_rate: f64,
    pub extras: u32,
    pub batting: Vec<BattingLine>,
    pub bowling: Vec<BowlingLine>,
    /// Delivery tokens of the current (or just completed) over.
    pub this_over: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_bowler: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattingLine {
    pub id: PlayerId,
    pub name: String,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub strike_rate: f64,
    pub status: String,
    pub on_strike: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlingLine {
    pub id: PlayerId,
    pub name: String,
    pub overs: OverNotation,
    pub maidens: u32,
    pub runs: u32,
    pub wickets: u32,
    pub economy: f64,
}

impl Scorecard {
    pub fn from_state(state: &InningsState) -> Self {
        let run_rate = if state.legal_balls > 0 {
            round2(f64::from(state.total_runs) * 6.0 / f64::from(state.legal_balls))
        } else {
            0.0
        };

        // Batting order is the order batters first appear: log first, then
        // anyone nominated who has not faced yet.
        let mut order: Vec<&PlayerId> = Vec::new();
        for ball in &state.recent_balls {
            if !order.contains(&&ball.striker_id) {
                order.push(&ball.striker_id);
            }
        }
        for id in state.batting.keys() {
            if !order.contains(&id) {
                order.push(id);
            }
        }

        let batting = order
            .into_iter()
            .filter_map(|id| state.batting.get(id))
            .map(|b| BattingLine {
                id: b.id.clone(),
                name: b.name.clone(),
                runs: b.runs,
                balls: b.balls,
                fours: b.fours,
                sixes: b.sixes,
                strike_rate: round2(b.strike_rate()),
                status: b.out_by.clone().unwrap_or_else(|| "not out".to_string()),
                on_strike: b.is_striker,
            })
            .collect();

        let bowling = state
            .bowling
            .values()
            .map(|b| BowlingLine {
                id: b.id.clone(),
                name: b.name.clone(),
                overs: b.overs,
                maidens: b.maidens,
                runs: b.runs_conceded,
                wickets: b.wickets,
                economy: round2(b.economy()),
            })
            .collect();

        Self {
            batting_team: state.batting_team.clone(),
            bowling_team: state.bowling_team.clone(),
            score: format!("{}/{}", state.total_runs, state.wickets),
            overs: state.overs,
            run_rate,
            extras: state.extras.total(),
            batting,
            bowling,
            this_over: state.current_over_balls().iter().map(|b| b.display_token()).collect(),
            current_bowler: state.current_bowler_id.id().cloned(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::{play, ready_innings};
    use crate::models::BallOutcome;

    #[test]
    fn test_scorecard_after_a_few_balls() {
        let state = play(
            ready_innings(),
            &[BallOutcome::runs(4), BallOutcome::wide(0), BallOutcome::runs(1), BallOutcome::dot()],
        );
        let card = Scorecard::from_state(&state);

        assert_eq!(card.score, "6/0");
        assert_eq!(card.overs.to_string(), "0.3");
        assert_eq!(card.run_rate, 12.0);
        assert_eq!(card.extras, 1);
        assert_eq!(card.this_over, vec!["4", "Wd", "1", "0"]);
        assert_eq!(card.batting[0].name, "Smith");
        assert_eq!(card.batting[0].runs, 5);
        assert_eq!(card.batting[0].status, "not out");
        assert_eq!(card.batting[1].name, "Nelson");
        assert!(card.batting[1].on_strike);
        assert_eq!(card.bowling[0].runs, 6);
    }

    #[test]
    fn test_this_over_shows_completed_over_until_next_ball() {
        let state = play(ready_innings(), &[BallOutcome::dot(); 6]);
        let card = Scorecard::from_state(&state);
        assert_eq!(card.this_over.len(), 6);
        assert_eq!(card.current_bowler, None);
        assert_eq!(card.bowling[0].maidens, 1);

        let state = play(state, &[BallOutcome::runs(2)]);
        assert_eq!(Scorecard::from_state(&state).this_over, vec!["2"]);
    }

    #[test]
    fn test_dismissal_shows_in_status() {
        let state = play(ready_innings(), &[BallOutcome::wicket()]);
        let card = Scorecard::from_state(&state);
        assert_eq!(card.score, "0/1");
        assert_eq!(card.batting[0].status, "b Brown");
        assert!(card.batting.iter().all(|b| !b.on_strike));
    }
}
