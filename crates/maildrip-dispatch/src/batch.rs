//! Batch scheduler: partitions a recipient set into fixed-size batches and
//! paces their dispatch.
//!
//! Every batch deadline is computed up front as `start + k * interval`, so a
//! batch fires on its own schedule regardless of how long earlier batches
//! take. Outcomes are still collected in batch-index order, and the run as a
//! whole resolves only after the last batch has fired and finished.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};

use crate::prelude::*;
use crate::transport::{BatchOutcome, BatchTransport};

pub const DEFAULT_BATCH_LIMIT: usize = 500;
/// Default inter-batch interval in minutes (one day)
pub const DEFAULT_BATCH_INTERVAL_MIN: u64 = 1440;

/// Dispatches `recipients` in contiguous batches of `batch_limit` through
/// `transport`, initiating batch `k` after `k * interval`.
///
/// Returns one outcome per batch, in batch order; a single batch failure is
/// contained to that batch's outcome. An empty recipient set yields an
/// empty vec. `batch_limit` must be positive; entry points validate this
/// before a run is scheduled.
pub async fn run_batches(
	transport: Arc<dyn BatchTransport>,
	recipients: &[Box<str>],
	subject: &str,
	html: &str,
	batch_limit: usize,
	interval: Duration,
) -> MdResult<Vec<BatchOutcome>> {
	if batch_limit == 0 {
		return Err(Error::ValidationError("Batch limit must be at least 1".into()));
	}
	if recipients.is_empty() {
		return Ok(Vec::new());
	}

	let start = Instant::now();
	let mut handles = Vec::new();

	for (k, chunk) in recipients.chunks(batch_limit).enumerate() {
		let deadline = start + interval.saturating_mul(k as u32);
		let transport = transport.clone();
		let batch: Vec<Box<str>> = chunk.to_vec();
		let subject = subject.to_string();
		let html = html.to_string();

		handles.push(tokio::spawn(async move {
			sleep_until(deadline).await;
			debug!("Initiating batch {} ({} recipients)", k, batch.len());
			transport.send_batch(&batch, &subject, &html).await
		}));
	}

	let batch_count = handles.len();
	let mut outcomes = Vec::with_capacity(batch_count);
	for (k, handle) in handles.into_iter().enumerate() {
		match handle.await {
			Ok(outcome) => outcomes.push(outcome),
			Err(err) => {
				error!("Batch {} task failed: {}", k, err);
				let slice = recipients.chunks(batch_limit).nth(k).unwrap_or(&[]);
				outcomes.push(BatchOutcome::rejected_all(slice, "Batch task failed"));
			}
		}
	}

	info!("Dispatched {} recipients in {} batches", recipients.len(), batch_count);
	Ok(outcomes)
}


// vim: ts=4
