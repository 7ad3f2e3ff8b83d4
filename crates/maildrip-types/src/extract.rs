//! Custom Axum extractors for maildrip-specific types.
//!
//! Provides a `FromRequestParts` implementation for the authenticated user,
//! placed into request extensions by the route auth middleware.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::Error;
use crate::types::UserId;

// Auth //
//******//
/// Authenticated user extracted from request extensions (set by auth middleware).
#[derive(Clone, Copy, Debug)]
pub struct Auth(pub UserId);

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		if let Some(auth) = parts.extensions.get::<Auth>().copied() {
			Ok(auth)
		} else {
			Err(Error::PermissionDenied)
		}
	}
}

// vim: ts=4
