use http::Response;
use presentation_voting_store::RosterDocument;

use crate::error::AppError;
use crate::response::{ok_json, ResponseBody};
use crate::VotingState;

pub fn list(state: &VotingState) -> Result<Response<ResponseBody>, AppError> {
    ok_json(&RosterDocument {
        presentations: state.store.presentations(),
    })
}
