//! SMTP credential profile storage
//!
//! The secret column only ever holds ciphertext; the read path decrypts so
//! the dispatch core sees usable credentials.

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use maildrip_types::prelude::*;
use maildrip_types::smtp_adapter::{CreateSmtpProfile, SmtpAdapter, SmtpProfile};

use crate::{StoreAdapterSqlite, collect_res, inspect, map_res};

fn row_to_profile(row: &SqliteRow) -> Result<SmtpProfile, sqlx::Error> {
	Ok(SmtpProfile {
		smtp_id: row.try_get("smtp_id")?,
		user_id: UserId(row.try_get("user_id")?),
		name: row.try_get("name")?,
		service: row.try_get("service")?,
		pool: row.try_get("pool")?,
		host: row.try_get("host")?,
		port: row.try_get::<Option<i64>, _>("port")?.map(|p| p as u16),
		secure: row.try_get("secure")?,
		username: row.try_get("username")?,
		secret: row.try_get("secret")?,
		from_email: row.try_get("from_email")?,
	})
}

#[async_trait]
impl SmtpAdapter for StoreAdapterSqlite {
	async fn read_profile(&self, user_id: UserId, smtp_id: i64) -> MdResult<SmtpProfile> {
		let res = sqlx::query(
			"SELECT smtp_id, user_id, name, service, pool, host, port, secure, username, secret, from_email
			FROM smtp_profiles WHERE smtp_id = ?1 AND user_id = ?2",
		)
		.bind(smtp_id)
		.bind(user_id.0)
		.fetch_one(self.db())
		.await;

		let mut profile = map_res(res, |row| row_to_profile(&row))?;
		profile.secret = self.cipher().decrypt(&profile.secret)?.into();
		Ok(profile)
	}

	async fn create_profile(&self, user_id: UserId, data: CreateSmtpProfile<'_>) -> MdResult<i64> {
		let secret = self.cipher().encrypt(data.secret)?;

		let res = sqlx::query(
			"INSERT INTO smtp_profiles (user_id, name, service, pool, host, port, secure, username, secret, from_email)
			VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
			RETURNING smtp_id",
		)
		.bind(user_id.0)
		.bind(data.name)
		.bind(data.service)
		.bind(data.pool)
		.bind(data.host)
		.bind(data.port.map(i64::from))
		.bind(data.secure)
		.bind(data.username)
		.bind(secret)
		.bind(data.from_email)
		.fetch_one(self.db())
		.await;

		map_res(res, |row| row.try_get("smtp_id"))
	}

	async fn list_profiles(&self, user_id: UserId) -> MdResult<Vec<SmtpProfile>> {
		let rows = sqlx::query(
			"SELECT smtp_id, user_id, name, service, pool, host, port, secure, username, secret, from_email
			FROM smtp_profiles WHERE user_id = ?1 ORDER BY smtp_id",
		)
		.bind(user_id.0)
		.fetch_all(self.db())
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

		let mut profiles = collect_res(rows.iter().map(row_to_profile))?;
		for profile in &mut profiles {
			profile.secret = self.cipher().decrypt(&profile.secret)?.into();
		}
		Ok(profiles)
	}

	async fn delete_profile(&self, user_id: UserId, smtp_id: i64) -> MdResult<()> {
		let res = sqlx::query("DELETE FROM smtp_profiles WHERE smtp_id = ?1 AND user_id = ?2")
			.bind(smtp_id)
			.bind(user_id.0)
			.execute(self.db())
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;

		if res.rows_affected() == 0 {
			return Err(Error::NotFound);
		}
		Ok(())
	}
}

// vim: ts=4
