use bytes::Bytes;
use headers::{CacheControl, ContentType, Header, HeaderMapExt as _};
use http::{Response, StatusCode};
use http_body_util::{BodyExt as _, Full, Limited};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, BoxError};

pub type ResponseBody = Full<Bytes>;

pub trait ResponseTypedHeaderExt {
    #[must_use]
    fn typed_header<H: Header>(self, header: H) -> Self;
}

impl ResponseTypedHeaderExt for http::response::Builder {
    fn typed_header<H: Header>(mut self, header: H) -> Self {
        if let Some(headers) = self.headers_mut() {
            headers.typed_insert(header);
        }
        self
    }
}

/// Clients poll these endpoints, so nothing may be cached.
pub fn json_response<T: Serialize>(
    status: StatusCode,
    value: &T,
) -> Result<Response<ResponseBody>, AppError> {
    let body = serde_json::to_vec(value).map_err(AppError::ResponseJson)?;
    Ok(Response::builder()
        .status(status)
        .typed_header(ContentType::json())
        .typed_header(CacheControl::new().with_no_store())
        .body(Full::new(Bytes::from(body)))?)
}

pub fn ok_json<T: Serialize>(value: &T) -> Result<Response<ResponseBody>, AppError> {
    json_response(StatusCode::OK, value)
}

pub async fn read_json<T, B>(body: B, limit: usize) -> Result<T, AppError>
where
    T: DeserializeOwned,
    B: http_body::Body,
    B::Error: Into<BoxError>,
{
    let bytes = Limited::new(body, limit)
        .collect()
        .await
        .map_err(|err| {
            if err.is::<http_body_util::LengthLimitError>() {
                AppError::PayloadTooLarge
            } else {
                AppError::Body(err)
            }
        })?
        .to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}
