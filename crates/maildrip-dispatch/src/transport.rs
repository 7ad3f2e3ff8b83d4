//! SMTP batch transport adapter using lettre
//!
//! One delivery transaction per recipient batch. Transport-level failures
//! never escape this module: they are converted into a fully-rejected
//! `BatchOutcome` so one bad batch cannot abort a dispatch run.

use async_trait::async_trait;
use lettre::message::{Mailbox, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::OnceCell;

use crate::prelude::*;
use maildrip_types::smtp_adapter::SmtpProfile;
use maildrip_types::utils::random_id;

/// Per-recipient result of one batch transaction.
///
/// On success `accepted` holds the batch addresses that made it into the
/// envelope and `rejected` the ones that did not parse; on transport
/// failure the whole batch lands in `rejected` and `response` carries the
/// failure description.
#[derive(Clone, Debug, Default)]
pub struct BatchOutcome {
	pub accepted: Vec<Box<str>>,
	pub rejected: Vec<Box<str>>,
	pub message_id: Option<Box<str>>,
	pub response: Option<Box<str>>,
}

impl BatchOutcome {
	/// Outcome for a batch whose transaction failed as a whole
	pub fn rejected_all(batch: &[Box<str>], response: impl Into<Box<str>>) -> Self {
		Self {
			accepted: Vec::new(),
			rejected: batch.to_vec(),
			message_id: None,
			response: Some(response.into()),
		}
	}
}

/// One outbound-mail attempt for one batch of recipients.
///
/// Implementations must not raise past this boundary; every failure mode
/// is reported through the returned `BatchOutcome`.
#[async_trait]
pub trait BatchTransport: Send + Sync {
	async fn send_batch(&self, recipients: &[Box<str>], subject: &str, html: &str)
	-> BatchOutcome;
}

/// Resolved connection endpoint for a credential profile
struct Endpoint {
	host: Box<str>,
	port: Option<u16>,
	secure: bool,
}

/// Well-known service names, mirroring the usual transport-library presets
fn service_endpoint(service: &str) -> MdResult<Endpoint> {
	let (host, port, secure) = match service.to_ascii_lowercase().as_str() {
		"gmail" => ("smtp.gmail.com", 465, true),
		"outlook" | "office365" => ("smtp.office365.com", 587, false),
		"sendgrid" => ("smtp.sendgrid.net", 587, false),
		"mailgun" => ("smtp.mailgun.org", 587, false),
		"zoho" => ("smtp.zoho.com", 465, true),
		_ => {
			return Err(Error::ConfigError(format!("Unknown SMTP service: {}", service)));
		}
	};
	Ok(Endpoint { host: host.into(), port: Some(port), secure })
}

/// Batch transport bound to one credential profile for the duration of a
/// dispatch run.
pub struct SmtpBatchTransport {
	profile: SmtpProfile,
	from: Mailbox,
	/// Transport cache, used only when the profile asks for pooling
	pooled: OnceCell<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpBatchTransport {
	/// Binds the transport to a profile and an effective sender address
	/// (override wins over the profile default).
	pub fn new(profile: SmtpProfile, from_override: Option<&str>) -> MdResult<Self> {
		let from = from_override
			.unwrap_or(&profile.from_email)
			.parse()
			.map_err(|_| Error::ValidationError("Invalid from email format".into()))?;

		Ok(Self { profile, from, pooled: OnceCell::new() })
	}

	fn endpoint(&self) -> MdResult<Endpoint> {
		if let Some(service) = &self.profile.service {
			return service_endpoint(service);
		}
		let Some(host) = &self.profile.host else {
			return Err(Error::ConfigError("SMTP profile has neither service nor host".into()));
		};
		Ok(Endpoint {
			host: host.clone(),
			port: self.profile.port,
			secure: self.profile.secure.unwrap_or(false),
		})
	}

	fn build_transport(&self) -> MdResult<AsyncSmtpTransport<Tokio1Executor>> {
		let endpoint = self.endpoint()?;

		let tls_parameters =
			lettre::transport::smtp::client::TlsParameters::builder(endpoint.host.to_string())
				.build()
				.map_err(|e| Error::ConfigError(format!("TLS configuration error: {}", e)))?;
		let tls = if endpoint.secure {
			lettre::transport::smtp::client::Tls::Wrapper(tls_parameters)
		} else {
			lettre::transport::smtp::client::Tls::Opportunistic(tls_parameters)
		};

		let credentials = Credentials::new(
			self.profile.username.to_string(),
			self.profile.secret.to_string(),
		);

		// Absent optional fields are left to the library defaults instead of
		// being forced onto the builder.
		let mut builder =
			AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(endpoint.host.as_ref())
				.tls(tls)
				.credentials(credentials);
		if let Some(port) = endpoint.port {
			builder = builder.port(port);
		}

		Ok(builder.build())
	}

	/// The profile's pool flag keeps one transport alive for the rest of the
	/// run; otherwise every batch gets a transient connection.
	async fn transport(&self) -> MdResult<AsyncSmtpTransport<Tokio1Executor>> {
		if self.profile.pool == Some(true) {
			let transport =
				self.pooled.get_or_try_init(|| async { self.build_transport() }).await?;
			Ok(transport.clone())
		} else {
			self.build_transport()
		}
	}

	async fn try_send(
		&self,
		recipients: &[Box<str>],
		subject: &str,
		html: &str,
	) -> MdResult<BatchOutcome> {
		let mut parsed: Vec<Box<str>> = Vec::with_capacity(recipients.len());
		let mut mailboxes: Vec<Mailbox> = Vec::with_capacity(recipients.len());
		let mut rejected: Vec<Box<str>> = Vec::new();

		for addr in recipients {
			match addr.parse::<Mailbox>() {
				Ok(mailbox) => {
					parsed.push(addr.clone());
					mailboxes.push(mailbox);
				}
				Err(_) => rejected.push(addr.clone()),
			}
		}

		if mailboxes.is_empty() {
			return Ok(BatchOutcome {
				accepted: Vec::new(),
				rejected,
				message_id: None,
				response: Some("No valid recipient addresses in batch".into()),
			});
		}

		let message_id = format!("<{}@maildrip>", random_id()?);
		let mut builder =
			Message::builder().from(self.from.clone()).subject(subject).message_id(Some(
				message_id.clone(),
			));
		for mailbox in mailboxes {
			builder = builder.to(mailbox);
		}
		let email = builder
			.singlepart(SinglePart::html(html.to_string()))
			.map_err(|e| Error::ValidationError(format!("Failed to build email: {}", e)))?;

		let mailer = self.transport().await?;
		match mailer.send(email).await {
			Ok(response) => {
				let text = response.message().collect::<Vec<_>>().join(" ");
				debug!("Batch accepted by relay ({} recipients): {}", parsed.len(), text);
				Ok(BatchOutcome {
					accepted: parsed,
					rejected,
					message_id: Some(message_id.into()),
					response: Some(format!("{} {}", response.code(), text).into()),
				})
			}
			Err(err) => {
				warn!("SMTP send failed for batch of {}: {}", recipients.len(), err);
				Ok(BatchOutcome::rejected_all(recipients, format!("SMTP send failed: {}", err)))
			}
		}
	}
}

#[async_trait]
impl BatchTransport for SmtpBatchTransport {
	async fn send_batch(
		&self,
		recipients: &[Box<str>],
		subject: &str,
		html: &str,
	) -> BatchOutcome {
		match self.try_send(recipients, subject, html).await {
			Ok(outcome) => outcome,
			Err(err) => {
				warn!("Batch transport error: {}", err);
				BatchOutcome::rejected_all(recipients, err.to_string())
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn profile(service: Option<&str>, host: Option<&str>) -> SmtpProfile {
		SmtpProfile {
			smtp_id: 1,
			user_id: UserId(1),
			name: "test".into(),
			service: service.map(Into::into),
			pool: None,
			host: host.map(Into::into),
			port: None,
			secure: None,
			username: "user".into(),
			secret: "pass".into(),
			from_email: "news@example.com".into(),
		}
	}

	#[test]
	fn known_service_resolves() {
		let endpoint = service_endpoint("gmail").unwrap();
		assert_eq!(endpoint.host.as_ref(), "smtp.gmail.com");
		assert_eq!(endpoint.port, Some(465));
		assert!(endpoint.secure);
	}

	#[test]
	fn unknown_service_is_config_error() {
		assert!(service_endpoint("pigeon-post").is_err());
	}

	#[test]
	fn from_override_wins() {
		let transport =
			SmtpBatchTransport::new(profile(None, Some("mail.example.com")), Some("other@example.com"))
				.unwrap();
		assert_eq!(transport.from.email.to_string(), "other@example.com");
	}

	#[test]
	fn invalid_from_is_rejected() {
		assert!(SmtpBatchTransport::new(profile(None, Some("mail.example.com")), Some("nope")).is_err());
	}

	#[test]
	fn profile_without_endpoint_is_config_error() {
		let transport = SmtpBatchTransport::new(profile(None, None), None).unwrap();
		assert!(transport.endpoint().is_err());
	}

	#[tokio::test]
	async fn unreachable_relay_rejects_whole_batch() {
		let mut p = profile(None, Some("127.0.0.1"));
		p.port = Some(1); // nothing listens here
		let transport = SmtpBatchTransport::new(p, None).unwrap();

		let batch: Vec<Box<str>> = vec!["a@example.com".into(), "b@example.com".into()];
		let outcome = transport.send_batch(&batch, "subject", "<p>hi</p>").await;

		assert!(outcome.accepted.is_empty());
		assert_eq!(outcome.rejected, batch);
		assert!(outcome.message_id.is_none());
		assert!(outcome.response.is_some());
	}

	#[tokio::test]
	async fn unparseable_addresses_reject_individually() {
		// All addresses invalid: no transaction is attempted at all
		let transport = SmtpBatchTransport::new(profile(None, Some("127.0.0.1")), None).unwrap();
		let batch: Vec<Box<str>> = vec!["not-an-address".into(), "@missing-local".into()];
		let outcome = transport.send_batch(&batch, "subject", "<p>hi</p>").await;

		assert!(outcome.accepted.is_empty());
		assert_eq!(outcome.rejected.len(), 2);
	}
}

// vim: ts=4
