//! Bearer-token route auth middleware.
//!
//! Validates the `Authorization: Bearer` header as an HS256 JWT and places
//! the authenticated user into request extensions for the `Auth` extractor.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use serde::{Deserialize, Serialize};

use crate::prelude::*;
use maildrip_types::extract::Auth;

const TOKEN_EXPIRE: i64 = 8 * 3600; /* seconds */

#[derive(Debug, Deserialize, Serialize)]
pub struct Claims {
	pub sub: i64,
	pub exp: i64,
}

/// Issues an access token for the given user
pub fn generate_access_token(user_id: UserId, jwt_secret: &str) -> MdResult<Box<str>> {
	let claims = Claims { sub: user_id.0, exp: now().0 + TOKEN_EXPIRE };
	let token = jsonwebtoken::encode(
		&jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
		&claims,
		&jsonwebtoken::EncodingKey::from_secret(jwt_secret.as_bytes()),
	)
	.map_err(|_| Error::PermissionDenied)?
	.into();

	Ok(token)
}

fn validate_token(token: &str, jwt_secret: &str) -> MdResult<UserId> {
	let data = jsonwebtoken::decode::<Claims>(
		token,
		&jsonwebtoken::DecodingKey::from_secret(jwt_secret.as_bytes()),
		&jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256),
	)
	.map_err(|_| Error::PermissionDenied)?;

	Ok(UserId(data.claims.sub))
}

/// Middleware rejecting requests without a valid bearer token
pub async fn require_auth(
	State(app): State<App>,
	mut req: Request,
	next: Next,
) -> MdResult<Response> {
	let token = req
		.headers()
		.get(axum::http::header::AUTHORIZATION)
		.and_then(|v| v.to_str().ok())
		.and_then(|v| v.strip_prefix("Bearer "))
		.ok_or(Error::PermissionDenied)?;

	let user_id = validate_token(token, &app.opts.jwt_secret)?;
	req.extensions_mut().insert(Auth(user_id));

	Ok(next.run(req).await)
}


// vim: ts=4
