use http::Response;

use crate::error::AppError;
use crate::response::{ok_json, ResponseBody};
use crate::VotingState;

/// Participants compare `lastConfigUpdate` from here against what they submit.
pub fn show(state: &VotingState) -> Result<Response<ResponseBody>, AppError> {
    ok_json(&state.store.config())
}
