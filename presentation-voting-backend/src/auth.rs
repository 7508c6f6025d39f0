use headers::authorization::Bearer;
use headers::{Authorization, HeaderMapExt as _};
use http::HeaderMap;
use sha2::{Digest as _, Sha256};

use crate::error::AppError;

/// The shared admin password. Only its digest is kept so comparisons always
/// look at equally long values.
pub struct AdminSecret {
    digest: [u8; 32],
}

impl AdminSecret {
    #[must_use]
    pub fn new(password: &str) -> Self {
        Self {
            digest: Sha256::digest(password.as_bytes()).into(),
        }
    }

    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        let candidate: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();
        candidate
            .iter()
            .zip(self.digest.iter())
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    /// Expects `Authorization: Bearer <password>`.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), AppError> {
        match headers.typed_get::<Authorization<Bearer>>() {
            Some(Authorization(bearer)) if self.matches(bearer.token()) => Ok(()),
            _ => Err(AppError::Unauthorized),
        }
    }
}
