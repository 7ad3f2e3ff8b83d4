//! Operator report for a finished dispatch run.
//!
//! Renders a sent/failed summary with accepted and rejected recipient
//! tables and mails it to the configured operator address through the
//! simple sender. A missing operator address fails the report, never the
//! dispatch itself; callers log and move on.

use maildrip_core::app::AppBuilderOpts;

use crate::aggregate::AggregateOutcome;
use crate::prelude::*;
use crate::sender::Mailer;

/// Rendered report, ready for the simple sender
#[derive(Debug)]
pub struct Report {
	pub subject: String,
	pub html: String,
}

fn render_table(addresses: &[Box<str>], class: &str, empty_note: &str) -> String {
	if addresses.is_empty() {
		return format!("<p>{}</p>", empty_note);
	}
	let rows: String = addresses
		.iter()
		.map(|addr| format!("<tr><td class=\"{}\">{}</td></tr>", class, addr))
		.collect();
	format!("<table><tr><th>Email Address</th></tr>{}</table>", rows)
}

/// Renders the summary subject and HTML body
pub fn render(aggregate: &AggregateOutcome) -> Report {
	let total_sent = aggregate.accepted.len();
	let total_failed = aggregate.rejected.len();

	let subject = format!("Email Report: {} Sent, {} Failed", total_sent, total_failed);

	let html = format!(
		"<html><body>\
		<h1>Email Dispatch Report</h1>\
		<p><strong>Total Emails Sent:</strong> {}</p>\
		<p><strong>Total Emails Failed:</strong> {}</p>\
		<p><strong>Message ID:</strong> {}</p>\
		<h2>Accepted Recipients</h2>{}\
		<h2>Rejected Recipients</h2>{}\
		<h2>Server Response</h2><p>{}</p>\
		</body></html>",
		total_sent,
		total_failed,
		aggregate.message_id.as_deref().unwrap_or(""),
		render_table(&aggregate.accepted, "success", "No emails were accepted."),
		render_table(&aggregate.rejected, "failure", "No emails were rejected."),
		aggregate.response.as_deref().unwrap_or(""),
	);

	Report { subject, html }
}

/// Delivers the report to the operator address from runtime options
pub async fn deliver(opts: &AppBuilderOpts, aggregate: &AggregateOutcome) -> MdResult<()> {
	let Some(report_email) = &opts.report_email else {
		return Err(Error::ConfigError("Operator report address is not configured".into()));
	};

	let report = render(aggregate);
	let mailer = Mailer::from_opts(opts)?;
	mailer.send_one(report_email, &report.subject, &report.html).await?;

	info!("Dispatch report delivered to {}", report_email);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn aggregate() -> AggregateOutcome {
		AggregateOutcome {
			accepted: vec!["a@x.com".into(), "b@x.com".into()],
			rejected: vec!["c@x.com".into()],
			message_id: Some("<abc123@maildrip>".into()),
			response: Some("250 OK".into()),
		}
	}

	#[test]
	fn subject_states_counts() {
		let report = render(&aggregate());
		assert_eq!(report.subject, "Email Report: 2 Sent, 1 Failed");
	}

	#[test]
	fn body_lists_recipients_and_response() {
		let report = render(&aggregate());
		assert!(report.html.contains("a@x.com"));
		assert!(report.html.contains("b@x.com"));
		assert!(report.html.contains("c@x.com"));
		assert!(report.html.contains("250 OK"));
		assert!(report.html.contains("&lt;abc123@maildrip&gt;") || report.html.contains("<abc123@maildrip>"));
	}

	#[test]
	fn empty_lists_render_notes() {
		let report = render(&AggregateOutcome::default());
		assert_eq!(report.subject, "Email Report: 0 Sent, 0 Failed");
		assert!(report.html.contains("No emails were accepted."));
		assert!(report.html.contains("No emails were rejected."));
	}

	#[tokio::test]
	async fn missing_operator_address_is_a_config_error() {
		let opts = AppBuilderOpts::default();
		let err = deliver(&opts, &aggregate()).await.unwrap_err();
		assert!(matches!(err, Error::ConfigError(_)));
	}
}

// vim: ts=4
