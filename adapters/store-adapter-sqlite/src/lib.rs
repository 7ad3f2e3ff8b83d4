//! SQLite-backed store adapter for maildrip.
//!
//! Implements both store traits on one pool: SMTP credential profiles
//! (secret AES-GCM encrypted at rest, decrypted on read) and the
//! subscriber/segment store used for recipient resolution.

use std::path::Path;

use sqlx::sqlite::{self, SqlitePool, SqliteRow};

use maildrip_core::crypto::SecretCipher;
use maildrip_types::prelude::*;

mod list;
mod schema;
mod smtp;

fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

pub(crate) fn map_res<T, F>(row: Result<SqliteRow, sqlx::Error>, f: F) -> MdResult<T>
where
	F: FnOnce(SqliteRow) -> Result<T, sqlx::Error>,
{
	match row {
		Ok(row) => f(row).inspect_err(inspect).map_err(|_| Error::DbError),
		Err(sqlx::Error::RowNotFound) => Err(Error::NotFound),
		Err(err) => {
			inspect(&err);
			Err(Error::DbError)
		}
	}
}

pub(crate) fn collect_res<T>(
	iter: impl Iterator<Item = Result<T, sqlx::Error>>,
) -> MdResult<Vec<T>> {
	let mut items = Vec::new();
	for item in iter {
		items.push(item.inspect_err(inspect).map_err(|_| Error::DbError)?);
	}
	Ok(items)
}

#[derive(Debug)]
pub struct StoreAdapterSqlite {
	db: SqlitePool,
	cipher: SecretCipher,
}

impl StoreAdapterSqlite {
	pub async fn new(path: impl AsRef<Path>, cipher: SecretCipher) -> MdResult<Self> {
		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| warn!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| warn!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		Ok(Self { db, cipher })
	}

	pub(crate) fn db(&self) -> &SqlitePool {
		&self.db
	}

	pub(crate) fn cipher(&self) -> &SecretCipher {
		&self.cipher
	}
}

// vim: ts=4
