//! Adapter that stores subscriber lists and their segments.
//!
//! The dispatch core only ever queries it for recipient resolution; list
//! management beyond that is the concern of whoever owns the store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Debug;

use crate::prelude::*;

/// A subscriber on a user's list
#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
	pub subscriber_id: i64,
	pub name: Box<str>,
	pub email: Box<str>,
	pub segment_id: i64,
	pub created_by: UserId,
	pub is_subscribed: bool,
}

/// A named grouping of subscribers, used to scope bulk sends
#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
	pub segment_id: i64,
	pub name: Box<str>,
	pub description: Option<Box<str>>,
	pub created_by: UserId,
}

/// Data needed to create a new subscriber
#[derive(Debug)]
pub struct CreateSubscriber<'a> {
	pub name: &'a str,
	pub email: &'a str,
	pub segment_id: i64,
}

/// Data needed to create a new segment
#[derive(Debug)]
pub struct CreateSegment<'a> {
	pub name: &'a str,
	pub description: Option<&'a str>,
}

/// A maildrip subscriber list adapter
#[async_trait]
pub trait ListAdapter: Debug + Send + Sync {
	/// Lists the subscribed members of the user's whole list.
	/// An empty list is not an error; the caller decides what that means.
	async fn list_subscribers(&self, user_id: UserId) -> MdResult<Vec<Subscriber>>;

	/// Lists the subscribed members of one segment owned by the user
	async fn list_subscribers_by_segment(
		&self,
		user_id: UserId,
		segment_id: i64,
	) -> MdResult<Vec<Subscriber>>;

	/// Creates a segment, returning its id
	async fn create_segment(&self, user_id: UserId, data: CreateSegment<'_>) -> MdResult<i64>;

	/// Creates a subscriber, returning its id
	async fn create_subscriber(&self, user_id: UserId, data: CreateSubscriber<'_>)
	-> MdResult<i64>;
}

// vim: ts=4
