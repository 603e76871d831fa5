//! # Caller Identity
//!
//! Authentication happens upstream of this service. The gateway that verifies
//! the caller's credentials forwards the resolved identity in two headers:
//!
//! - `X-User-Id`: the caller's UUID (user id for students, counselor id for
//!   counselors)
//! - `X-User-Role`: one of `student`, `counselor`, `admin`
//!
//! Handlers that need an identity take a [`Caller`] argument; a request
//! without valid headers is rejected with `401 Unauthorized` before the
//! handler body runs.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, HeaderName},
};
use counselbook_core::{
    errors::BookingError,
    models::actor::{Actor, Role},
};
use uuid::Uuid;

use crate::middleware::error_handling::AppError;

pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");
pub const USER_ROLE_HEADER: HeaderName = HeaderName::from_static("x-user-role");

/// The authenticated caller of the current request.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Actor);

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Result<&'a str, BookingError> {
    headers
        .get(name)
        .ok_or_else(|| BookingError::Authentication(format!("Missing {} header", name)))?
        .to_str()
        .map_err(|_| BookingError::Authentication(format!("Malformed {} header", name)))
}

/// Resolves the caller identity from forwarded headers.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, BookingError> {
    let id = header_str(headers, &USER_ID_HEADER)?
        .trim()
        .parse::<Uuid>()
        .map_err(|_| BookingError::Authentication("Caller id is not a valid UUID".to_string()))?;
    let role = header_str(headers, &USER_ROLE_HEADER)?.parse::<Role>()?;

    Ok(Actor { id, role })
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = actor_from_headers(&parts.headers)?;
        tracing::debug!("Resolved caller: id={}, role={}", actor.id, actor.role);
        Ok(Caller(actor))
    }
}
