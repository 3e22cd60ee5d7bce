pub mod json_api;

pub use json_api::{
    apply_ball_json, open_session_json, record_ball_json, revert_json, scorecard_json,
    undo_ball_json, SessionResponse,
};
