//! App state type and builder

use std::sync::Arc;

use crate::jobs::JobRegistry;
use crate::prelude::*;

use maildrip_types::list_adapter::ListAdapter;
use maildrip_types::smtp_adapter::SmtpAdapter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub opts: AppBuilderOpts,
	pub jobs: JobRegistry,

	pub smtp_adapter: Arc<dyn SmtpAdapter>,
	pub list_adapter: Arc<dyn ListAdapter>,
}

pub type App = Arc<AppState>;

pub struct Adapters {
	pub smtp_adapter: Option<Arc<dyn SmtpAdapter>>,
	pub list_adapter: Option<Arc<dyn ListAdapter>>,
}

#[derive(Debug)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	/// HS256 secret for bearer tokens
	pub jwt_secret: Box<str>,
	/// Operator address the dispatch reports are delivered to
	pub report_email: Option<Box<str>>,
	/// SMTP endpoint used for one-off notification mail (reports)
	pub mailer_host: Option<Box<str>>,
	pub mailer_port: Option<u16>,
	pub mailer_secure: Option<bool>,
	pub mailer_username: Option<Box<str>>,
	pub mailer_secret: Option<Box<str>>,
	pub mailer_from: Option<Box<str>>,
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		Self {
			listen: "127.0.0.1:8080".into(),
			jwt_secret: "".into(),
			report_email: None,
			mailer_host: None,
			mailer_port: None,
			mailer_secure: None,
			mailer_username: None,
			mailer_secret: None,
			mailer_from: None,
		}
	}
}

pub struct AppBuilder {
	opts: AppBuilderOpts,
	adapters: Adapters,
}

impl AppBuilder {
	pub fn new() -> Self {
		AppBuilder {
			opts: AppBuilderOpts::default(),
			adapters: Adapters { smtp_adapter: None, list_adapter: None },
		}
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn jwt_secret(&mut self, jwt_secret: impl Into<Box<str>>) -> &mut Self {
		self.opts.jwt_secret = jwt_secret.into();
		self
	}
	pub fn report_email(&mut self, report_email: impl Into<Box<str>>) -> &mut Self {
		self.opts.report_email = Some(report_email.into());
		self
	}
	pub fn mailer_host(&mut self, mailer_host: impl Into<Box<str>>) -> &mut Self {
		self.opts.mailer_host = Some(mailer_host.into());
		self
	}
	pub fn mailer_port(&mut self, mailer_port: u16) -> &mut Self {
		self.opts.mailer_port = Some(mailer_port);
		self
	}
	pub fn mailer_secure(&mut self, mailer_secure: bool) -> &mut Self {
		self.opts.mailer_secure = Some(mailer_secure);
		self
	}
	pub fn mailer_username(&mut self, mailer_username: impl Into<Box<str>>) -> &mut Self {
		self.opts.mailer_username = Some(mailer_username.into());
		self
	}
	pub fn mailer_secret(&mut self, mailer_secret: impl Into<Box<str>>) -> &mut Self {
		self.opts.mailer_secret = Some(mailer_secret.into());
		self
	}
	pub fn mailer_from(&mut self, mailer_from: impl Into<Box<str>>) -> &mut Self {
		self.opts.mailer_from = Some(mailer_from.into());
		self
	}

	// Adapters
	pub fn smtp_adapter(&mut self, smtp_adapter: Arc<dyn SmtpAdapter>) -> &mut Self {
		self.adapters.smtp_adapter = Some(smtp_adapter);
		self
	}
	pub fn list_adapter(&mut self, list_adapter: Arc<dyn ListAdapter>) -> &mut Self {
		self.adapters.list_adapter = Some(list_adapter);
		self
	}

	pub fn build(self) -> MdResult<App> {
		if self.opts.jwt_secret.is_empty() {
			error!("FATAL: No JWT secret configured");
			return Err(Error::ConfigError("No JWT secret configured".to_string()));
		}
		let Some(smtp_adapter) = self.adapters.smtp_adapter else {
			error!("FATAL: No SMTP adapter configured");
			return Err(Error::ConfigError("No SMTP adapter configured".to_string()));
		};
		let Some(list_adapter) = self.adapters.list_adapter else {
			error!("FATAL: No list adapter configured");
			return Err(Error::ConfigError("No list adapter configured".to_string()));
		};
		if self.opts.report_email.is_none() {
			warn!("No operator report address configured; dispatch reports will fail");
		}

		Ok(Arc::new(AppState {
			opts: self.opts,
			jobs: JobRegistry::new(),
			smtp_adapter,
			list_adapter,
		}))
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
