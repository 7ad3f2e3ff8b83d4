//! Dispatch aggregator: merges per-batch outcomes into one result.

use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::transport::BatchOutcome;

/// Merged result of one dispatch run.
///
/// Accepted and rejected lists are concatenations in batch order, without
/// deduplication. The scalar fields keep the first non-empty value seen
/// while scanning in order; per-batch detail is intentionally not retained.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateOutcome {
	pub accepted: Vec<Box<str>>,
	pub rejected: Vec<Box<str>>,
	pub message_id: Option<Box<str>>,
	pub response: Option<Box<str>>,
}

fn first_non_empty(current: Option<Box<str>>, candidate: Option<Box<str>>) -> Option<Box<str>> {
	match current {
		Some(value) if !value.is_empty() => Some(value),
		_ => candidate.filter(|value| !value.is_empty()),
	}
}

/// Folds batch outcomes, in dispatch order, into the aggregate
pub fn fold(outcomes: Vec<BatchOutcome>) -> AggregateOutcome {
	let mut aggregate = AggregateOutcome::default();
	for outcome in outcomes {
		aggregate.accepted.extend(outcome.accepted);
		aggregate.rejected.extend(outcome.rejected);
		aggregate.message_id = first_non_empty(aggregate.message_id, outcome.message_id);
		aggregate.response = first_non_empty(aggregate.response, outcome.response);
	}
	aggregate
}


// vim: ts=4
