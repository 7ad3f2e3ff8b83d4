//! Error type shared by every maildrip crate.
//!
//! Handlers return `MdResult<T>`; the `IntoResponse` impl maps each variant
//! onto an HTTP status with a JSON error body.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

pub type MdResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Request input failed validation (missing field, empty recipient list, ...)
	ValidationError(String),
	/// Referenced entity does not exist
	NotFound,
	/// Required runtime configuration is missing or malformed
	ConfigError(String),
	/// An upstream service (SMTP relay) refused or failed
	ServiceUnavailable(String),
	PermissionDenied,
	DbError,
	Parse,
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::NotFound => write!(f, "not found"),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::ServiceUnavailable(msg) => write!(f, "service unavailable: {}", msg),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::DbError => write!(f, "database error"),
			Error::Parse => write!(f, "parse error"),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

/// Wire format of an error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
	pub error: String,
}

impl ErrorBody {
	pub fn new(error: impl Into<String>) -> Self {
		Self { error: error.into() }
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		let (status, body) = match self {
			Error::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
			Error::NotFound => (StatusCode::NOT_FOUND, "not found".into()),
			Error::PermissionDenied => (StatusCode::UNAUTHORIZED, "permission denied".into()),
			Error::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
			Error::ConfigError(_) | Error::Internal(_) | Error::DbError => {
				(StatusCode::INTERNAL_SERVER_ERROR, "internal server error".into())
			}
			_ => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".into()),
		};
		(status, Json(ErrorBody::new(body))).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::response::IntoResponse;

	#[test]
	fn validation_error_maps_to_400() {
		let resp = Error::ValidationError("no recipients defined".into()).into_response();
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}

	#[test]
	fn not_found_maps_to_404() {
		let resp = Error::NotFound.into_response();
		assert_eq!(resp.status(), StatusCode::NOT_FOUND);
	}

	#[test]
	fn config_error_is_opaque_to_clients() {
		let resp = Error::ConfigError("MAILDRIP_REPORT_EMAIL is not set".into()).into_response();
		assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}

// vim: ts=4
