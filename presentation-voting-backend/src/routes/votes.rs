use http::Response;
use presentation_voting_store::{ConfigVersion, PresentationId, SessionId, StoreError};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{AppError, BoxError};
use crate::response::{ok_json, read_json, ResponseBody};
use crate::VotingState;

/// The two ballot shapes share one endpoint and are told apart by their fields.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum SubmitVotePayload {
    #[serde(rename_all = "camelCase")]
    Selection {
        session_id: SessionId,
        selected_presentation_ids: Vec<PresentationId>,
        config_timestamp: ConfigVersion,
    },
    #[serde(rename_all = "camelCase")]
    Rating {
        session_id: SessionId,
        presentation_id: PresentationId,
        rating: u8,
        #[serde(default)]
        config_timestamp: Option<ConfigVersion>,
    },
}

pub fn show(state: &VotingState, session_id: &str) -> Result<Response<ResponseBody>, AppError> {
    let votes = state.store.votes(&SessionId::from(session_id))?;
    ok_json(&json!({ "votes": votes }))
}

pub async fn submit<B>(state: &VotingState, body: B) -> Result<Response<ResponseBody>, AppError>
where
    B: http_body::Body,
    B::Error: Into<BoxError>,
{
    let payload = match read_json::<SubmitVotePayload, _>(body, state.max_body_bytes).await {
        Ok(payload) => payload,
        // a closed vote is reported as such even for garbage input
        Err(AppError::Json(err)) => {
            if state.store.config().voting_active {
                return Err(AppError::Json(err));
            }
            return Err(StoreError::VotingClosed.into());
        }
        Err(err) => return Err(err),
    };

    match payload {
        SubmitVotePayload::Selection {
            session_id,
            selected_presentation_ids,
            config_timestamp,
        } => {
            state
                .store
                .submit_selections(&session_id, &selected_presentation_ids, config_timestamp)?;
            debug!(session = %session_id, count = selected_presentation_ids.len(), "recorded selection");
        }
        SubmitVotePayload::Rating {
            session_id,
            presentation_id,
            rating,
            config_timestamp,
        } => {
            state
                .store
                .submit_rating(&session_id, presentation_id, rating, config_timestamp)?;
            debug!(session = %session_id, presentation = %presentation_id, rating, "recorded rating");
        }
    }
    ok_json(&json!({ "success": true }))
}
