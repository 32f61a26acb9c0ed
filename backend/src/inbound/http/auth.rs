//! Header-based caller identification.
//!
//! Every `/api/v1` endpoint acts on behalf of the user named by the
//! `X-User-Id` header. The extractor only checks the header's shape; whether
//! the user exists is decided by the service handling the request.

use actix_web::http::header::HeaderValue;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use serde_json::json;

use crate::domain::{Error, UserId};

/// Header carrying the caller's user id.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// The caller resolved from the `X-User-Id` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    /// Caller's user id.
    pub fn user_id(&self) -> &UserId {
        &self.0
    }

    /// Consume the wrapper.
    pub fn into_inner(self) -> UserId {
        self.0
    }
}

fn unauthorized(message: &str, code: &str) -> Error {
    Error::unauthorized(message).with_details(json!({
        "header": USER_ID_HEADER,
        "code": code,
    }))
}

/// Resolve the caller from a raw header value.
///
/// Missing or blank values and values that are not UUIDs are rejected with
/// `401 unauthorized`.
pub fn resolve_user_id(value: Option<&HeaderValue>) -> Result<UserId, Error> {
    let raw = value
        .map(|header| header.to_str().map(str::trim))
        .transpose()
        .map_err(|_| unauthorized("X-User-Id header must be a valid UUID", "invalid_user_id"))?
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| unauthorized("X-User-Id header is required", "missing_user_id"))?;

    UserId::new(raw)
        .map_err(|_| unauthorized("X-User-Id header must be a valid UUID", "invalid_user_id"))
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve_user_id(req.headers().get(USER_ID_HEADER)).map(Self))
    }
}
