use http::{Response, StatusCode};
use presentation_voting_store::SessionId;
use serde::Serialize;
use tracing::debug;

use crate::error::AppError;
use crate::response::{json_response, ResponseBody};
use crate::VotingState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSession {
    session_id: SessionId,
}

pub fn create(state: &VotingState) -> Result<Response<ResponseBody>, AppError> {
    let session_id = state.store.create_session();
    debug!(session = %session_id, "issued session");
    json_response(StatusCode::OK, &CreatedSession { session_id })
}
