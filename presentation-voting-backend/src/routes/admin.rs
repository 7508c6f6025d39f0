use http::Response;
use presentation_voting_store::{
    ConfigSnapshot, Presentation, SessionVotes, Stats, ThemeId, ThemeSettings,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, BoxError};
use crate::response::{ok_json, read_json, ResponseBody};
use crate::VotingState;

#[derive(Serialize)]
struct Overview {
    #[serde(flatten)]
    stats: Stats,
    #[serde(flatten)]
    config: ConfigSnapshot,
}

#[derive(Serialize)]
struct AllVotes {
    votes: Vec<SessionVotes>,
}

#[derive(Deserialize)]
struct TogglePayload {
    active: bool,
}

#[derive(Deserialize)]
struct RosterPayload {
    presentations: Vec<Presentation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequiredSelectionsPayload {
    required_selections: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemePayload {
    selected_theme: u8,
    random_theme: bool,
}

pub fn stats(state: &VotingState) -> Result<Response<ResponseBody>, AppError> {
    let (stats, config) = state.store.overview();
    ok_json(&Overview { stats, config })
}

pub fn all_votes(state: &VotingState) -> Result<Response<ResponseBody>, AppError> {
    ok_json(&AllVotes {
        votes: state.store.all_votes(),
    })
}

pub async fn toggle_voting<B>(
    state: &VotingState,
    body: B,
) -> Result<Response<ResponseBody>, AppError>
where
    B: http_body::Body,
    B::Error: Into<BoxError>,
{
    let TogglePayload { active } = read_json(body, state.max_body_bytes).await?;
    state.store.set_voting_active(active);
    ok_json(&json!({ "success": true, "votingActive": active }))
}

pub async fn upload_presentations<B>(
    state: &VotingState,
    body: B,
) -> Result<Response<ResponseBody>, AppError>
where
    B: http_body::Body,
    B::Error: Into<BoxError>,
{
    let RosterPayload { presentations } = read_json(body, state.max_body_bytes).await?;
    let version = state.store.upload_roster(presentations)?;
    ok_json(&json!({
        "success": true,
        "message": "Presentations updated and all votes have been reset.",
        "lastConfigUpdate": version,
    }))
}

pub async fn update_config<B>(
    state: &VotingState,
    body: B,
) -> Result<Response<ResponseBody>, AppError>
where
    B: http_body::Body,
    B::Error: Into<BoxError>,
{
    let RequiredSelectionsPayload {
        required_selections,
    } = read_json(body, state.max_body_bytes).await?;
    let version = state.store.set_required_selections(required_selections)?;
    ok_json(&json!({
        "success": true,
        "message": "Required selections updated and all votes have been reset.",
        "lastConfigUpdate": version,
    }))
}

pub async fn update_theme<B>(
    state: &VotingState,
    body: B,
) -> Result<Response<ResponseBody>, AppError>
where
    B: http_body::Body,
    B::Error: Into<BoxError>,
{
    let ThemePayload {
        selected_theme,
        random_theme,
    } = read_json(body, state.max_body_bytes).await?;
    let settings = ThemeSettings {
        selected: ThemeId::new(selected_theme)?,
        random: random_theme,
    };
    state.store.set_theme(settings);
    ok_json(&json!({
        "success": true,
        "selectedTheme": settings.selected,
        "randomTheme": settings.random,
    }))
}
