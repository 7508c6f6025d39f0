use http::{Method, Request, Response};

use crate::error::{AppError, BoxError};
use crate::response::ResponseBody;
use crate::routes::{admin, config, health, presentations, session, theme, votes};
use crate::VotingState;

#[derive(Debug, PartialEq, Eq)]
pub enum Route<'a> {
    CreateSession,
    Presentations,
    Config,
    Theme,
    Health,
    Votes(&'a str),
    SubmitVote,
    AdminStats,
    AdminAllVotes,
    AdminToggleVoting,
    AdminPresentations,
    AdminConfig,
    AdminTheme,
}

impl Route<'_> {
    #[must_use]
    pub const fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::AdminStats
                | Self::AdminAllVotes
                | Self::AdminToggleVoting
                | Self::AdminPresentations
                | Self::AdminConfig
                | Self::AdminTheme
        )
    }
}

/// Paths are accepted with and without the `/api` prefix. A known path with the
/// wrong method is a 405, anything else a 404.
pub fn resolve<'a>(method: &Method, path: &'a str) -> Result<Route<'a>, AppError> {
    let path = match path.strip_prefix("/api") {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    };
    let segments: Vec<&'a str> = path.split('/').filter(|segment| !segment.is_empty()).collect();

    let (allowed, route) = match segments.as_slice() {
        ["session"] => (Method::POST, Route::CreateSession),
        ["presentations"] => (Method::GET, Route::Presentations),
        ["config"] => (Method::GET, Route::Config),
        ["theme"] => (Method::GET, Route::Theme),
        ["health"] => (Method::GET, Route::Health),
        ["votes"] => (Method::POST, Route::SubmitVote),
        ["votes", session_id] => (Method::GET, Route::Votes(*session_id)),
        ["admin", "stats"] => (Method::GET, Route::AdminStats),
        ["admin", "all-votes"] => (Method::GET, Route::AdminAllVotes),
        ["admin", "toggle-voting"] => (Method::POST, Route::AdminToggleVoting),
        ["admin", "presentations"] => (Method::POST, Route::AdminPresentations),
        ["admin", "config"] => (Method::POST, Route::AdminConfig),
        ["admin", "theme"] => (Method::POST, Route::AdminTheme),
        _ => return Err(AppError::NotFound),
    };
    if *method == allowed {
        Ok(route)
    } else {
        Err(AppError::MethodNotAllowed)
    }
}

pub async fn dispatch<B>(
    state: &VotingState,
    request: Request<B>,
) -> Result<Response<ResponseBody>, AppError>
where
    B: http_body::Body,
    B::Error: Into<BoxError>,
{
    let (parts, body) = request.into_parts();
    let route = resolve(&parts.method, parts.uri.path())?;
    if route.requires_admin() {
        state.admin.authorize(&parts.headers)?;
    }

    match route {
        Route::CreateSession => session::create(state),
        Route::Presentations => presentations::list(state),
        Route::Config => config::show(state),
        Route::Theme => theme::show(state),
        Route::Health => health::check(),
        Route::Votes(session_id) => votes::show(state, session_id),
        Route::SubmitVote => votes::submit(state, body).await,
        Route::AdminStats => admin::stats(state),
        Route::AdminAllVotes => admin::all_votes(state),
        Route::AdminToggleVoting => admin::toggle_voting(state, body).await,
        Route::AdminPresentations => admin::upload_presentations(state, body).await,
        Route::AdminConfig => admin::update_config(state, body).await,
        Route::AdminTheme => admin::update_theme(state, body).await,
    }
}
