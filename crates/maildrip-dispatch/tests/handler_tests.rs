//! Entry point tests
//!
//! Drives the dispatch entry points through a real axum router with
//! in-memory adapters, checking the synchronous validation paths and that
//! rejected requests schedule no background work.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::routing::post;
use axum::{Router, middleware};
use tower::ServiceExt;

use maildrip_core::app::{App, AppBuilder};
use maildrip_core::route_auth::{generate_access_token, require_auth};
use maildrip_dispatch::handler;
use maildrip_types::error::MdResult;
use maildrip_types::list_adapter::{CreateSegment, CreateSubscriber, ListAdapter, Subscriber};
use maildrip_types::smtp_adapter::{CreateSmtpProfile, SmtpAdapter, SmtpProfile};
use maildrip_types::types::UserId;

const JWT_SECRET: &str = "test-secret";

#[derive(Debug, Default)]
struct MemSmtpAdapter {
	profiles: Vec<SmtpProfile>,
}

impl MemSmtpAdapter {
	fn with_profile(user_id: UserId, smtp_id: i64) -> Arc<Self> {
		Arc::new(Self {
			profiles: vec![SmtpProfile {
				smtp_id,
				user_id,
				name: "test relay".into(),
				service: None,
				pool: None,
				host: Some("127.0.0.1".into()),
				port: Some(1),
				secure: Some(false),
				username: "user".into(),
				secret: "pass".into(),
				from_email: "news@example.com".into(),
			}],
		})
	}
}

#[async_trait]
impl SmtpAdapter for MemSmtpAdapter {
	async fn read_profile(&self, user_id: UserId, smtp_id: i64) -> MdResult<SmtpProfile> {
		self.profiles
			.iter()
			.find(|p| p.user_id == user_id && p.smtp_id == smtp_id)
			.cloned()
			.ok_or(maildrip_types::error::Error::NotFound)
	}

	async fn create_profile(
		&self,
		_user_id: UserId,
		_data: CreateSmtpProfile<'_>,
	) -> MdResult<i64> {
		unimplemented!("not used in these tests")
	}

	async fn list_profiles(&self, user_id: UserId) -> MdResult<Vec<SmtpProfile>> {
		Ok(self.profiles.iter().filter(|p| p.user_id == user_id).cloned().collect())
	}

	async fn delete_profile(&self, _user_id: UserId, _smtp_id: i64) -> MdResult<()> {
		unimplemented!("not used in these tests")
	}
}

#[derive(Debug, Default)]
struct MemListAdapter {
	subscribers: Vec<Subscriber>,
	queries: AtomicUsize,
}

impl MemListAdapter {
	fn empty() -> Arc<Self> {
		Arc::new(Self::default())
	}

	fn with_subscribers(user_id: UserId, segment_id: i64, emails: &[&str]) -> Arc<Self> {
		Arc::new(Self {
			subscribers: emails
				.iter()
				.enumerate()
				.map(|(i, email)| Subscriber {
					subscriber_id: i as i64 + 1,
					name: format!("subscriber {}", i).into(),
					email: Box::from(*email),
					segment_id,
					created_by: user_id,
					is_subscribed: true,
				})
				.collect(),
			queries: AtomicUsize::new(0),
		})
	}

	fn query_count(&self) -> usize {
		self.queries.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ListAdapter for MemListAdapter {
	async fn list_subscribers(&self, user_id: UserId) -> MdResult<Vec<Subscriber>> {
		self.queries.fetch_add(1, Ordering::SeqCst);
		Ok(self
			.subscribers
			.iter()
			.filter(|s| s.created_by == user_id && s.is_subscribed)
			.cloned()
			.collect())
	}

	async fn list_subscribers_by_segment(
		&self,
		user_id: UserId,
		segment_id: i64,
	) -> MdResult<Vec<Subscriber>> {
		self.queries.fetch_add(1, Ordering::SeqCst);
		Ok(self
			.subscribers
			.iter()
			.filter(|s| s.created_by == user_id && s.segment_id == segment_id && s.is_subscribed)
			.cloned()
			.collect())
	}

	async fn create_segment(&self, _user_id: UserId, _data: CreateSegment<'_>) -> MdResult<i64> {
		unimplemented!("not used in these tests")
	}

	async fn create_subscriber(
		&self,
		_user_id: UserId,
		_data: CreateSubscriber<'_>,
	) -> MdResult<i64> {
		unimplemented!("not used in these tests")
	}
}

fn build_app(smtp: Arc<MemSmtpAdapter>, list: Arc<MemListAdapter>) -> App {
	let mut builder = AppBuilder::new();
	builder.jwt_secret(JWT_SECRET).smtp_adapter(smtp).list_adapter(list);
	builder.build().unwrap()
}

fn router(app: App) -> Router {
	Router::new()
		.route("/api/send", post(handler::post_send))
		.route("/api/predefined", post(handler::post_send_predefined))
		.layer(middleware::from_fn_with_state(app.clone(), require_auth))
		.with_state(app)
}

fn request(path: &str, user_id: UserId, body: serde_json::Value) -> Request<Body> {
	let token = generate_access_token(user_id, JWT_SECRET).unwrap();
	Request::builder()
		.method("POST")
		.uri(path)
		.header(header::CONTENT_TYPE, "application/json")
		.header(header::AUTHORIZATION, format!("Bearer {}", token))
		.body(Body::from(body.to_string()))
		.unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
	let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn send_acknowledges_with_202_and_count() {
	let user = UserId(1);
	let app = build_app(MemSmtpAdapter::with_profile(user, 10), MemListAdapter::empty());

	let response = router(app.clone())
		.oneshot(request(
			"/api/send",
			user,
			serde_json::json!({
				"smtpId": 10,
				"recipients": ["a@example.com", "b@example.com"],
				"subject": "hello",
				"content": "<p>hi</p>",
				"batchInterval": 0,
			}),
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::ACCEPTED);
	let body = body_json(response).await;
	assert_eq!(body["totalRecipients"], 2);
	assert_eq!(body["message"], "Email sending process initiated");
}

#[tokio::test]
async fn send_accepts_a_single_recipient_string() {
	let user = UserId(1);
	let app = build_app(MemSmtpAdapter::with_profile(user, 10), MemListAdapter::empty());

	let response = router(app)
		.oneshot(request(
			"/api/send",
			user,
			serde_json::json!({
				"smtpId": 10,
				"recipients": "only@example.com",
				"subject": "hello",
				"content": "<p>hi</p>",
				"batchInterval": 0,
			}),
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::ACCEPTED);
	let body = body_json(response).await;
	assert_eq!(body["totalRecipients"], 1);
}

#[tokio::test]
async fn send_with_empty_recipients_is_400_and_schedules_nothing() {
	let user = UserId(1);
	let app = build_app(MemSmtpAdapter::with_profile(user, 10), MemListAdapter::empty());

	let response = router(app.clone())
		.oneshot(request(
			"/api/send",
			user,
			serde_json::json!({
				"smtpId": 10,
				"recipients": [],
				"subject": "hello",
				"content": "<p>hi</p>",
			}),
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	let body = body_json(response).await;
	assert_eq!(body["error"], "No recipients defined");
	assert_eq!(app.jobs.running(), 0);
}

#[tokio::test]
async fn send_with_unknown_smtp_is_400() {
	let user = UserId(1);
	let app = build_app(MemSmtpAdapter::with_profile(user, 10), MemListAdapter::empty());

	let response = router(app.clone())
		.oneshot(request(
			"/api/send",
			user,
			serde_json::json!({
				"smtpId": 99,
				"recipients": ["a@example.com"],
				"subject": "hello",
				"content": "<p>hi</p>",
			}),
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	let body = body_json(response).await;
	assert_eq!(body["error"], "SMTP not found");
	assert_eq!(app.jobs.running(), 0);
}

#[tokio::test]
async fn send_with_zero_batch_limit_is_400() {
	let user = UserId(1);
	let app = build_app(MemSmtpAdapter::with_profile(user, 10), MemListAdapter::empty());

	let response = router(app.clone())
		.oneshot(request(
			"/api/send",
			user,
			serde_json::json!({
				"smtpId": 10,
				"recipients": ["a@example.com"],
				"subject": "hello",
				"content": "<p>hi</p>",
				"batchLimit": 0,
			}),
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(app.jobs.running(), 0);
}

#[tokio::test]
async fn send_without_token_is_401() {
	let user = UserId(1);
	let app = build_app(MemSmtpAdapter::with_profile(user, 10), MemListAdapter::empty());

	let response = router(app)
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/api/send")
				.header(header::CONTENT_TYPE, "application/json")
				.body(Body::from("{}"))
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn predefined_resolves_own_subscriber_list() {
	let user = UserId(1);
	let list = MemListAdapter::with_subscribers(user, 5, &["a@example.com", "b@example.com", "c@example.com"]);
	let app = build_app(MemSmtpAdapter::with_profile(user, 10), list.clone());

	let response = router(app)
		.oneshot(request(
			"/api/predefined",
			user,
			serde_json::json!({
				"smtpId": 10,
				"subject": "hello",
				"content": "<p>hi</p>",
				"method": "mySubscriberList",
				"batchInterval": 0,
			}),
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::ACCEPTED);
	let body = body_json(response).await;
	assert_eq!(body["totalRecipients"], 3);
	assert_eq!(list.query_count(), 1);
}

#[tokio::test]
async fn predefined_resolves_by_segment() {
	let user = UserId(1);
	let list = MemListAdapter::with_subscribers(user, 5, &["a@example.com", "b@example.com"]);
	let app = build_app(MemSmtpAdapter::with_profile(user, 10), list.clone());

	let response = router(app)
		.oneshot(request(
			"/api/predefined",
			user,
			serde_json::json!({
				"smtpId": 10,
				"subject": "hello",
				"content": "<p>hi</p>",
				"method": "bySegment",
				"segmentId": 5,
				"batchInterval": 0,
			}),
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::ACCEPTED);
	let body = body_json(response).await;
	assert_eq!(body["totalRecipients"], 2);
}

#[tokio::test]
async fn predefined_with_unknown_method_is_400() {
	let user = UserId(1);
	let list = MemListAdapter::with_subscribers(user, 5, &["a@example.com"]);
	let app = build_app(MemSmtpAdapter::with_profile(user, 10), list.clone());

	let response = router(app.clone())
		.oneshot(request(
			"/api/predefined",
			user,
			serde_json::json!({
				"smtpId": 10,
				"subject": "hello",
				"content": "<p>hi</p>",
				"method": "everyoneIveEverMet",
			}),
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(list.query_count(), 0);
	assert_eq!(app.jobs.running(), 0);
}

#[tokio::test]
async fn predefined_by_segment_without_segment_id_is_400_before_any_query() {
	let user = UserId(1);
	let list = MemListAdapter::with_subscribers(user, 5, &["a@example.com"]);
	let app = build_app(MemSmtpAdapter::with_profile(user, 10), list.clone());

	let response = router(app.clone())
		.oneshot(request(
			"/api/predefined",
			user,
			serde_json::json!({
				"smtpId": 10,
				"subject": "hello",
				"content": "<p>hi</p>",
				"method": "bySegment",
			}),
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(list.query_count(), 0);
	assert_eq!(app.jobs.running(), 0);
}

#[tokio::test]
async fn predefined_with_no_resolved_recipients_is_404() {
	let user = UserId(1);
	let app = build_app(MemSmtpAdapter::with_profile(user, 10), MemListAdapter::empty());

	let response = router(app.clone())
		.oneshot(request(
			"/api/predefined",
			user,
			serde_json::json!({
				"smtpId": 10,
				"subject": "hello",
				"content": "<p>hi</p>",
				"method": "mySubscriberList",
			}),
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert_eq!(app.jobs.running(), 0);
}

#[tokio::test]
async fn predefined_skips_unsubscribed_members() {
	let user = UserId(1);
	let list = Arc::new(MemListAdapter {
		subscribers: vec![
			Subscriber {
				subscriber_id: 1,
				name: "active".into(),
				email: "active@example.com".into(),
				segment_id: 5,
				created_by: user,
				is_subscribed: true,
			},
			Subscriber {
				subscriber_id: 2,
				name: "gone".into(),
				email: "gone@example.com".into(),
				segment_id: 5,
				created_by: user,
				is_subscribed: false,
			},
		],
		queries: AtomicUsize::new(0),
	});
	let app = build_app(MemSmtpAdapter::with_profile(user, 10), list);

	let response = router(app)
		.oneshot(request(
			"/api/predefined",
			user,
			serde_json::json!({
				"smtpId": 10,
				"subject": "hello",
				"content": "<p>hi</p>",
				"method": "mySubscriberList",
				"batchInterval": 0,
			}),
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::ACCEPTED);
	let body = body_json(response).await;
	assert_eq!(body["totalRecipients"], 1);
}
