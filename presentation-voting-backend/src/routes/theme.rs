use http::Response;
use presentation_voting_store::Theme;
use serde::Serialize;

use crate::error::AppError;
use crate::response::{ok_json, ResponseBody};
use crate::VotingState;

#[derive(Serialize)]
struct EffectiveTheme {
    #[serde(flatten)]
    theme: &'static Theme,
    random: bool,
}

pub fn show(state: &VotingState) -> Result<Response<ResponseBody>, AppError> {
    let settings = state.store.theme();
    let theme = settings.resolve(&mut rand::thread_rng());
    ok_json(&EffectiveTheme {
        theme,
        random: settings.random,
    })
}
