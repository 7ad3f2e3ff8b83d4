//! In-memory dispatch job registry.
//!
//! Every background dispatch run gets a job record so operators can see
//! what is in flight. Records are not persisted: a process restart drops
//! in-flight and completed runs alike.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::prelude::*;
use maildrip_types::utils::random_id;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobStatus {
	Running,
	Completed,
	Failed,
}

/// One dispatch run
#[derive(Clone, Debug)]
pub struct DispatchJob {
	pub job_id: Box<str>,
	pub user_id: UserId,
	pub total_recipients: usize,
	pub status: JobStatus,
	pub started_at: Timestamp,
	pub finished_at: Option<Timestamp>,
	pub sent: usize,
	pub failed: usize,
}

#[derive(Debug, Default)]
pub struct JobRegistry {
	jobs: RwLock<HashMap<Box<str>, DispatchJob>>,
}

impl JobRegistry {
	pub fn new() -> Self {
		Self { jobs: RwLock::new(HashMap::new()) }
	}

	/// Registers a new running job and returns its id
	pub fn start(&self, user_id: UserId, total_recipients: usize) -> MdResult<Box<str>> {
		let job_id: Box<str> = random_id()?.into();
		let job = DispatchJob {
			job_id: job_id.clone(),
			user_id,
			total_recipients,
			status: JobStatus::Running,
			started_at: now(),
			finished_at: None,
			sent: 0,
			failed: 0,
		};
		self.jobs.write().insert(job_id.clone(), job);
		Ok(job_id)
	}

	pub fn complete(&self, job_id: &str, sent: usize, failed: usize) {
		let mut jobs = self.jobs.write();
		if let Some(job) = jobs.get_mut(job_id) {
			job.status = JobStatus::Completed;
			job.finished_at = Some(now());
			job.sent = sent;
			job.failed = failed;
		}
	}

	pub fn fail(&self, job_id: &str) {
		let mut jobs = self.jobs.write();
		if let Some(job) = jobs.get_mut(job_id) {
			job.status = JobStatus::Failed;
			job.finished_at = Some(now());
		}
	}

	pub fn get(&self, job_id: &str) -> Option<DispatchJob> {
		self.jobs.read().get(job_id).cloned()
	}

	pub fn running(&self) -> usize {
		self.jobs.read().values().filter(|j| j.status == JobStatus::Running).count()
	}
}


// vim: ts=4
