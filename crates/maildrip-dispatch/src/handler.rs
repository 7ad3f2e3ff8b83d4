//! Dispatch entry points
//!
//! Two request-handling operations: send to explicit recipients, and send
//! to an implicitly-resolved recipient set (the caller's subscriber list or
//! one of their segments). Both validate synchronously, acknowledge with
//! 202, and leave the actual sending to a background task.
//!
//! Dispatch is not idempotent: re-posting the same request sends to every
//! recipient again.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::prelude::*;
use crate::task::{self, DispatchParams};
use crate::batch::{DEFAULT_BATCH_INTERVAL_MIN, DEFAULT_BATCH_LIMIT};
use maildrip_types::extract::Auth;
use maildrip_types::smtp_adapter::SmtpProfile;

/// A single address or a list of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
	One(String),
	Many(Vec<String>),
}

impl Recipients {
	fn into_vec(self) -> Vec<Box<str>> {
		match self {
			Recipients::One(addr) => vec![addr.into()],
			Recipients::Many(addrs) => addrs.into_iter().map(Into::into).collect(),
		}
	}
}

fn default_batch_limit() -> usize {
	DEFAULT_BATCH_LIMIT
}

fn default_batch_interval() -> u64 {
	DEFAULT_BATCH_INTERVAL_MIN
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMailRequest {
	pub smtp_id: i64,
	pub from_email: Option<String>,
	pub recipients: Recipients,
	pub subject: String,
	/// HTML body
	pub content: String,
	#[serde(default = "default_batch_limit")]
	pub batch_limit: usize,
	/// Minutes between batches
	#[serde(default = "default_batch_interval")]
	pub batch_interval: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendPredefinedRequest {
	pub smtp_id: i64,
	pub from_email: Option<String>,
	pub subject: String,
	pub content: String,
	#[serde(default = "default_batch_limit")]
	pub batch_limit: usize,
	#[serde(default = "default_batch_interval")]
	pub batch_interval: u64,
	/// "mySubscriberList" or "bySegment"
	pub method: String,
	pub segment_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMailResponse {
	pub message: String,
	pub total_recipients: usize,
}

async fn resolve_profile(app: &App, user_id: UserId, smtp_id: i64) -> MdResult<SmtpProfile> {
	app.smtp_adapter.read_profile(user_id, smtp_id).await.map_err(|err| match err {
		Error::NotFound => Error::ValidationError("SMTP not found".into()),
		other => other,
	})
}

fn acknowledge(
	app: &App,
	user_id: UserId,
	profile: SmtpProfile,
	from_email: Option<String>,
	recipients: Vec<Box<str>>,
	subject: String,
	content: String,
	batch_limit: usize,
	batch_interval: u64,
) -> MdResult<(StatusCode, Json<SendMailResponse>)> {
	let total_recipients = recipients.len();
	let job_id = task::spawn_dispatch(
		app.clone(),
		DispatchParams {
			profile,
			from_email: from_email.map(Into::into),
			recipients,
			subject,
			content,
			batch_limit,
			batch_interval,
		},
	)?;
	info!(
		user_id = %user_id,
		job_id = %job_id,
		total_recipients,
		"Email sending process initiated"
	);

	Ok((
		StatusCode::ACCEPTED,
		Json(SendMailResponse {
			message: "Email sending process initiated".into(),
			total_recipients,
		}),
	))
}

/// POST /api/send - dispatch to explicitly supplied recipients
#[axum::debug_handler]
pub async fn post_send(
	State(app): State<App>,
	Auth(user_id): Auth,
	Json(request): Json<SendMailRequest>,
) -> MdResult<(StatusCode, Json<SendMailResponse>)> {
	let recipients = request.recipients.into_vec();
	if recipients.is_empty() {
		return Err(Error::ValidationError("No recipients defined".into()));
	}
	if request.batch_limit == 0 {
		return Err(Error::ValidationError("Batch limit must be at least 1".into()));
	}

	let profile = resolve_profile(&app, user_id, request.smtp_id).await?;

	acknowledge(
		&app,
		user_id,
		profile,
		request.from_email,
		recipients,
		request.subject,
		request.content,
		request.batch_limit,
		request.batch_interval,
	)
}

/// POST /api/predefined - dispatch to the caller's subscriber list or
/// to one of their segments, selected by the method tag
#[axum::debug_handler]
pub async fn post_send_predefined(
	State(app): State<App>,
	Auth(user_id): Auth,
	Json(request): Json<SendPredefinedRequest>,
) -> MdResult<(StatusCode, Json<SendMailResponse>)> {
	if request.batch_limit == 0 {
		return Err(Error::ValidationError("Batch limit must be at least 1".into()));
	}

	let subscribers = match request.method.as_str() {
		"mySubscriberList" => app.list_adapter.list_subscribers(user_id).await?,
		"bySegment" => {
			let Some(segment_id) = request.segment_id else {
				return Err(Error::ValidationError(
					"segmentId is required for the bySegment method".into(),
				));
			};
			app.list_adapter.list_subscribers_by_segment(user_id, segment_id).await?
		}
		other => {
			return Err(Error::ValidationError(format!("Unknown method: {}", other)));
		}
	};

	let recipients: Vec<Box<str>> = subscribers.into_iter().map(|s| s.email).collect();
	if recipients.is_empty() {
		// nothing resolved: nothing to schedule
		return Err(Error::NotFound);
	}

	let profile = resolve_profile(&app, user_id, request.smtp_id).await?;

	acknowledge(
		&app,
		user_id,
		profile,
		request.from_email,
		recipients,
		request.subject,
		request.content,
		request.batch_limit,
		request.batch_interval,
	)
}

// vim: ts=4
