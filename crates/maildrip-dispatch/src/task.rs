//! Background dispatch run: scheduler → aggregator → report notifier.
//!
//! The entry points acknowledge the caller first, then hand the run to a
//! detached tokio task with its own error boundary. Nothing in here can
//! reach the HTTP caller; failures are logged and recorded on the job.

use std::sync::Arc;
use std::time::Duration;

use crate::prelude::*;
use crate::transport::{BatchTransport, SmtpBatchTransport};
use crate::{aggregate, batch, report};
use maildrip_types::smtp_adapter::SmtpProfile;

/// Everything a dispatch run needs, captured before acknowledgement
#[derive(Debug)]
pub struct DispatchParams {
	pub profile: SmtpProfile,
	pub from_email: Option<Box<str>>,
	pub recipients: Vec<Box<str>>,
	pub subject: String,
	pub content: String,
	pub batch_limit: usize,
	/// Inter-batch interval in minutes
	pub batch_interval: u64,
}

/// Runs the full pipeline for one dispatch and returns the aggregate.
///
/// The report step is driven by the caller so a report failure cannot be
/// confused with a dispatch failure.
pub async fn run_dispatch(params: &DispatchParams) -> MdResult<aggregate::AggregateOutcome> {
	let transport: Arc<dyn BatchTransport> = Arc::new(SmtpBatchTransport::new(
		params.profile.clone(),
		params.from_email.as_deref(),
	)?);

	let outcomes = batch::run_batches(
		transport,
		&params.recipients,
		&params.subject,
		&params.content,
		params.batch_limit,
		Duration::from_secs(params.batch_interval.saturating_mul(60)),
	)
	.await?;

	Ok(aggregate::fold(outcomes))
}

/// Registers a job and spawns the dispatch pipeline as detached background
/// work, returning the job id immediately.
pub fn spawn_dispatch(app: App, params: DispatchParams) -> MdResult<Box<str>> {
	let job_id = app.jobs.start(params.profile.user_id, params.recipients.len())?;

	let task_job_id = job_id.clone();
	tokio::spawn(async move {
		match run_dispatch(&params).await {
			Ok(aggregate) => {
				info!(
					"Dispatch {} finished: {} accepted, {} rejected",
					task_job_id,
					aggregate.accepted.len(),
					aggregate.rejected.len()
				);
				app.jobs.complete(&task_job_id, aggregate.accepted.len(), aggregate.rejected.len());

				// Terminal step: a failed report is logged, never retried
				if let Err(err) = report::deliver(&app.opts, &aggregate).await {
					error!("Failed to deliver dispatch report for {}: {}", task_job_id, err);
				}
			}
			Err(err) => {
				error!("Dispatch {} failed: {}", task_job_id, err);
				app.jobs.fail(&task_job_id);
			}
		}
	});

	Ok(job_id)
}

// vim: ts=4
