//! Router assembly

use axum::{
	Router, middleware,
	routing::{get, post},
};

use maildrip_core::app::{App, VERSION};
use maildrip_core::route_auth::require_auth;
use maildrip_dispatch::handler;

pub fn init(app: App) -> Router {
	let protected_router = Router::new()
		.route("/api/send", post(handler::post_send))
		.route("/api/predefined", post(handler::post_send_predefined))
		.layer(middleware::from_fn_with_state(app.clone(), require_auth));

	Router::new()
		.route("/health", get(async || format!("maildrip {}\n", VERSION)))
		.merge(protected_router)
		.with_state(app)
}

// vim: ts=4
