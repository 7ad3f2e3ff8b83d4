//! Batched, throttled bulk-email dispatch.
//!
//! This crate is the dispatch core of maildrip:
//! - Transport adapter: one SMTP transaction per recipient batch (lettre)
//! - Batch scheduler: fixed-size batches paced on precomputed deadlines
//! - Aggregator: merges per-batch outcomes into one dispatch result
//! - Report notifier: mails an operator summary through the simple sender
//! - HTTP entry points: acknowledge immediately, dispatch in the background

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod batch;
pub mod handler;
pub mod report;
pub mod sender;
pub mod task;
pub mod transport;

pub use aggregate::AggregateOutcome;
pub use sender::Mailer;
pub use task::DispatchParams;
pub use transport::{BatchOutcome, BatchTransport, SmtpBatchTransport};

mod prelude;

// vim: ts=4
