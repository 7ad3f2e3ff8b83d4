//! Subscriber and segment storage
//!
//! Recipient resolution only returns currently subscribed members.

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use maildrip_types::list_adapter::{
	CreateSegment, CreateSubscriber, ListAdapter, Subscriber,
};
use maildrip_types::prelude::*;

use crate::{StoreAdapterSqlite, collect_res, inspect, map_res};

fn row_to_subscriber(row: &SqliteRow) -> Result<Subscriber, sqlx::Error> {
	Ok(Subscriber {
		subscriber_id: row.try_get("subscriber_id")?,
		name: row.try_get("name")?,
		email: row.try_get("email")?,
		segment_id: row.try_get("segment_id")?,
		created_by: UserId(row.try_get("created_by")?),
		is_subscribed: row.try_get("is_subscribed")?,
	})
}

#[async_trait]
impl ListAdapter for StoreAdapterSqlite {
	async fn list_subscribers(&self, user_id: UserId) -> MdResult<Vec<Subscriber>> {
		let rows = sqlx::query(
			"SELECT subscriber_id, name, email, segment_id, created_by, is_subscribed
			FROM subscribers WHERE created_by = ?1 AND is_subscribed = 1 ORDER BY subscriber_id",
		)
		.bind(user_id.0)
		.fetch_all(self.db())
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

		collect_res(rows.iter().map(row_to_subscriber))
	}

	async fn list_subscribers_by_segment(
		&self,
		user_id: UserId,
		segment_id: i64,
	) -> MdResult<Vec<Subscriber>> {
		let rows = sqlx::query(
			"SELECT subscriber_id, name, email, segment_id, created_by, is_subscribed
			FROM subscribers
			WHERE created_by = ?1 AND segment_id = ?2 AND is_subscribed = 1
			ORDER BY subscriber_id",
		)
		.bind(user_id.0)
		.bind(segment_id)
		.fetch_all(self.db())
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

		collect_res(rows.iter().map(row_to_subscriber))
	}

	async fn create_segment(&self, user_id: UserId, data: CreateSegment<'_>) -> MdResult<i64> {
		let res = sqlx::query(
			"INSERT INTO segments (name, description, created_by) VALUES (?1, ?2, ?3)
			RETURNING segment_id",
		)
		.bind(data.name)
		.bind(data.description)
		.bind(user_id.0)
		.fetch_one(self.db())
		.await;

		map_res(res, |row| row.try_get("segment_id"))
	}

	async fn create_subscriber(
		&self,
		user_id: UserId,
		data: CreateSubscriber<'_>,
	) -> MdResult<i64> {
		let res = sqlx::query(
			"INSERT INTO subscribers (name, email, segment_id, created_by) VALUES (?1, ?2, ?3, ?4)
			RETURNING subscriber_id",
		)
		.bind(data.name)
		.bind(data.email)
		.bind(data.segment_id)
		.bind(user_id.0)
		.fetch_one(self.db())
		.await;

		map_res(res, |row| row.try_get("subscriber_id"))
	}
}

// vim: ts=4
