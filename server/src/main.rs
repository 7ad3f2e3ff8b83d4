//! maildrip server entry point
//!
//! Configuration is env-driven:
//! - `MAILDRIP_LISTEN` - listen address (default 127.0.0.1:8080)
//! - `MAILDRIP_DB_DIR` - data directory (default ./data)
//! - `MAILDRIP_JWT_SECRET` - bearer token secret (required)
//! - `MAILDRIP_ENCRYPTION_KEY` - passphrase for credential secrets at rest (required)
//! - `MAILDRIP_REPORT_EMAIL` - operator address for dispatch reports
//! - `MAILDRIP_MAILER_HOST` / `_PORT` / `_SECURE` / `_USERNAME` / `_SECRET` / `_FROM`
//!   - SMTP endpoint for one-off notification mail

#![forbid(unsafe_code)]

mod routes;

use std::{env, path::PathBuf, sync::Arc};

use tracing::{error, info};

use maildrip_core::app::AppBuilder;
use maildrip_core::crypto::SecretCipher;
use maildrip_store_adapter_sqlite::StoreAdapterSqlite;
use maildrip_types::error::{Error, MdResult};

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_target(false)
		.init();

	if let Err(err) = run().await {
		error!("FATAL: {}", err);
		std::process::exit(1);
	}
}

fn require_env(name: &str) -> MdResult<String> {
	env::var(name).map_err(|_| Error::ConfigError(format!("{} is not set", name)))
}

async fn run() -> MdResult<()> {
	info!("maildrip v{}", maildrip_core::app::VERSION);

	let listen = env::var("MAILDRIP_LISTEN").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
	let db_dir = PathBuf::from(env::var("MAILDRIP_DB_DIR").unwrap_or_else(|_| "./data".to_string()));
	let jwt_secret = require_env("MAILDRIP_JWT_SECRET")?;
	let encryption_key = require_env("MAILDRIP_ENCRYPTION_KEY")?;

	tokio::fs::create_dir_all(&db_dir).await.map_err(|e| {
		error!("FATAL: Cannot create data dir: {}", e);
		Error::ConfigError(format!("Cannot create data dir: {}", e))
	})?;

	let cipher = SecretCipher::new(&encryption_key)?;
	let store = Arc::new(StoreAdapterSqlite::new(db_dir.join("store.db"), cipher).await?);

	let mut builder = AppBuilder::new();
	builder
		.listen(listen)
		.jwt_secret(jwt_secret)
		.smtp_adapter(store.clone())
		.list_adapter(store);

	if let Ok(report_email) = env::var("MAILDRIP_REPORT_EMAIL") {
		builder.report_email(report_email);
	}
	if let Ok(host) = env::var("MAILDRIP_MAILER_HOST") {
		builder.mailer_host(host);
	}
	if let Ok(port) = env::var("MAILDRIP_MAILER_PORT") {
		let port = port
			.parse()
			.map_err(|_| Error::ConfigError("MAILDRIP_MAILER_PORT is not a port number".into()))?;
		builder.mailer_port(port);
	}
	if let Ok(secure) = env::var("MAILDRIP_MAILER_SECURE") {
		builder.mailer_secure(secure == "1" || secure.eq_ignore_ascii_case("true"));
	}
	if let Ok(username) = env::var("MAILDRIP_MAILER_USERNAME") {
		builder.mailer_username(username);
	}
	if let Ok(secret) = env::var("MAILDRIP_MAILER_SECRET") {
		builder.mailer_secret(secret);
	}
	if let Ok(from) = env::var("MAILDRIP_MAILER_FROM") {
		builder.mailer_from(from);
	}

	let app = builder.build()?;
	let router = routes::init(app.clone());

	let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await?;
	info!("Listening on {}", app.opts.listen);
	axum::serve(listener, router).await?;

	Ok(())
}

// vim: ts=4
