//! Adapter that manages and stores SMTP credential profiles.
//!
//! The profile secret is stored encrypted at rest; the read path hands it
//! back decrypted, so the dispatch core never touches ciphertext.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Debug;

use crate::prelude::*;

/// An SMTP credential profile owned by a user.
///
/// Optional fields mirror the transport options of the underlying mail
/// library: a named well-known `service` OR an explicit `host`/`port`/
/// `secure` triple. Absent fields are simply not applied to the transport
/// builder.
#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpProfile {
	pub smtp_id: i64,
	pub user_id: UserId,
	pub name: Box<str>,
	pub service: Option<Box<str>>,
	pub pool: Option<bool>,
	pub host: Option<Box<str>>,
	pub port: Option<u16>,
	pub secure: Option<bool>,
	pub username: Box<str>,
	/// Decrypted at read time, never serialized
	#[serde(skip_serializing)]
	pub secret: Box<str>,
	pub from_email: Box<str>,
}

/// Data needed to create a new SMTP profile (secret still in cleartext;
/// the adapter encrypts before persisting)
#[derive(Debug)]
pub struct CreateSmtpProfile<'a> {
	pub name: &'a str,
	pub service: Option<&'a str>,
	pub pool: Option<bool>,
	pub host: Option<&'a str>,
	pub port: Option<u16>,
	pub secure: Option<bool>,
	pub username: &'a str,
	pub secret: &'a str,
	pub from_email: &'a str,
}

/// A maildrip SMTP credential adapter
///
/// Responsible for storing credential profiles with the secret encrypted at
/// rest and returning them decrypted at the moment of use.
#[async_trait]
pub trait SmtpAdapter: Debug + Send + Sync {
	/// Reads a profile owned by the given user, secret decrypted.
	/// Returns `Error::NotFound` if the profile does not exist or is owned
	/// by someone else.
	async fn read_profile(&self, user_id: UserId, smtp_id: i64) -> MdResult<SmtpProfile>;

	/// Creates a new profile, returning its id
	async fn create_profile(&self, user_id: UserId, data: CreateSmtpProfile<'_>) -> MdResult<i64>;

	/// Lists the profiles of a user (secrets decrypted)
	async fn list_profiles(&self, user_id: UserId) -> MdResult<Vec<SmtpProfile>>;

	/// Deletes a profile owned by the given user
	async fn delete_profile(&self, user_id: UserId, smtp_id: i64) -> MdResult<()>;
}

// vim: ts=4
