use bytes::Bytes;
use headers::{CacheControl, ContentType, HeaderMapExt as _};
use http::{Response, StatusCode};
use http_body_util::Full;
use presentation_voting_config::ConfigError;
use presentation_voting_store::StoreError;
use serde_json::json;
use tracing::{debug, error};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("Invalid request body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read request body: {0}")]
    Body(BoxError),
    #[error("Request body too large")]
    PayloadTooLarge,
    #[error("Not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("failed to serialize response: {0}")]
    ResponseJson(serde_json::Error),
    #[error("http error: {0}")]
    Http(#[from] http::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("handler panicked")]
    Panic,
}

impl AppError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Json(_) | Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Store(StoreError::VotingClosed) => StatusCode::FORBIDDEN,
            Self::Store(StoreError::ConfigStale { .. }) => StatusCode::CONFLICT,
            Self::Store(StoreError::SessionNotFound) => StatusCode::NOT_FOUND,
            Self::Store(err) if err.is_validation() => StatusCode::BAD_REQUEST,
            Self::Store(_)
            | Self::ResponseJson(_)
            | Self::Http(_)
            | Self::Io(_)
            | Self::Config(_)
            | Self::Panic => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the error as `{"error": ...}`. Internal failures only show a generic
    /// message; the details go to the log.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status();
        let body = if status.is_server_error() {
            error!("internal error: {self}");
            json!({ "error": "Internal server error" })
        } else if let Self::Store(StoreError::ConfigStale { current }) = &self {
            debug!("rejected stale submission");
            json!({
                "error": self.to_string(),
                "requireReload": true,
                "lastConfigUpdate": current,
            })
        } else {
            debug!("rejected request: {self}");
            json!({ "error": self.to_string() })
        };

        let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
        *response.status_mut() = status;
        let headers = response.headers_mut();
        headers.typed_insert(ContentType::json());
        headers.typed_insert(CacheControl::new().with_no_store());
        response
    }
}
