//! Simple one-recipient sender using lettre
//!
//! The one-off notification path, distinct from the batch transport: used
//! for dispatch reports and other single mails, configured from the
//! process-wide mailer options rather than a per-user credential profile.

use lettre::message::SinglePart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use maildrip_core::app::AppBuilderOpts;

use crate::prelude::*;

#[derive(Debug)]
pub struct Mailer {
	transport: AsyncSmtpTransport<Tokio1Executor>,
	from: lettre::message::Mailbox,
}

impl Mailer {
	/// Builds the mailer from runtime options; every absent option is a
	/// configuration error because nothing else can supply it.
	pub fn from_opts(opts: &AppBuilderOpts) -> MdResult<Self> {
		let Some(host) = &opts.mailer_host else {
			return Err(Error::ConfigError("Mailer host is not configured".into()));
		};
		let Some(from) = &opts.mailer_from else {
			return Err(Error::ConfigError("Mailer from address is not configured".into()));
		};
		let from = from
			.parse()
			.map_err(|_| Error::ConfigError("Invalid mailer from address".into()))?;

		let tls_parameters =
			lettre::transport::smtp::client::TlsParameters::builder(host.to_string())
				.build()
				.map_err(|e| Error::ConfigError(format!("TLS configuration error: {}", e)))?;
		let tls = if opts.mailer_secure.unwrap_or(false) {
			lettre::transport::smtp::client::Tls::Wrapper(tls_parameters)
		} else {
			lettre::transport::smtp::client::Tls::Opportunistic(tls_parameters)
		};

		let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host.as_ref())
			.tls(tls);
		if let Some(port) = opts.mailer_port {
			builder = builder.port(port);
		}
		if let (Some(username), Some(secret)) = (&opts.mailer_username, &opts.mailer_secret) {
			builder = builder.credentials(Credentials::new(username.to_string(), secret.to_string()));
		}

		Ok(Self { transport: builder.build(), from })
	}

	/// Sends one HTML mail to one recipient; errors propagate to the caller
	pub async fn send_one(&self, to: &str, subject: &str, html: &str) -> MdResult<()> {
		let email = Message::builder()
			.from(self.from.clone())
			.to(to.parse().map_err(|_| {
				Error::ValidationError("Invalid recipient email format".into())
			})?)
			.subject(subject)
			.singlepart(SinglePart::html(html.to_string()))
			.map_err(|e| Error::ValidationError(format!("Failed to build email: {}", e)))?;

		match self.transport.send(email).await {
			Ok(response) => {
				debug!("Mail sent to {} ({})", to, response.code());
				Ok(())
			}
			Err(e) => {
				warn!("Failed to send mail to {}: {}", to, e);
				Err(Error::ServiceUnavailable(format!("SMTP send failed: {}", e)))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_host_is_config_error() {
		let opts = AppBuilderOpts::default();
		assert!(matches!(Mailer::from_opts(&opts).unwrap_err(), Error::ConfigError(_)));
	}

	#[test]
	fn missing_from_is_config_error() {
		let opts = AppBuilderOpts { mailer_host: Some("localhost".into()), ..Default::default() };
		assert!(matches!(Mailer::from_opts(&opts).unwrap_err(), Error::ConfigError(_)));
	}

	#[tokio::test]
	async fn complete_opts_build() {
		let opts = AppBuilderOpts {
			mailer_host: Some("localhost".into()),
			mailer_port: Some(1025),
			mailer_from: Some("reports@example.com".into()),
			mailer_username: Some("user".into()),
			mailer_secret: Some("pass".into()),
			..Default::default()
		};
		assert!(Mailer::from_opts(&opts).is_ok());
	}

	#[tokio::test]
	async fn invalid_recipient_is_rejected_before_sending() {
		let opts = AppBuilderOpts {
			mailer_host: Some("localhost".into()),
			mailer_from: Some("reports@example.com".into()),
			..Default::default()
		};
		let mailer = Mailer::from_opts(&opts).unwrap();
		let err = mailer.send_one("not-an-address", "s", "<p>b</p>").await.unwrap_err();
		assert!(matches!(err, Error::ValidationError(_)));
	}
}

// vim: ts=4
