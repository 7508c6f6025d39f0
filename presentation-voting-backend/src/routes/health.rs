use http::Response;
use serde_json::json;

use crate::error::AppError;
use crate::response::{ok_json, ResponseBody};

pub fn check() -> Result<Response<ResponseBody>, AppError> {
    ok_json(&json!({ "status": "ok" }))
}
