//! Database schema initialization
//!
//! Creates the tables and indexes on first start. All statements are
//! idempotent so the adapter can be pointed at an existing database.

use sqlx::SqlitePool;

pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// SMTP credential profiles
	//**************************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS smtp_profiles (
		smtp_id integer PRIMARY KEY AUTOINCREMENT,
		user_id integer NOT NULL,
		name text NOT NULL,
		service text,
		pool integer,
		host text,
		port integer,
		secure integer,
		username text NOT NULL,
		secret text NOT NULL,
		from_email text NOT NULL,
		created_at datetime DEFAULT (unixepoch())
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query("CREATE INDEX IF NOT EXISTS idx_smtp_profiles_user ON smtp_profiles (user_id)")
		.execute(&mut *tx)
		.await?;

	// Segments
	//**********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS segments (
		segment_id integer PRIMARY KEY AUTOINCREMENT,
		name text NOT NULL,
		description text,
		created_by integer NOT NULL,
		created_at datetime DEFAULT (unixepoch())
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query("CREATE INDEX IF NOT EXISTS idx_segments_user ON segments (created_by)")
		.execute(&mut *tx)
		.await?;

	// Subscribers
	//*************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS subscribers (
		subscriber_id integer PRIMARY KEY AUTOINCREMENT,
		name text NOT NULL,
		email text NOT NULL,
		segment_id integer NOT NULL,
		created_by integer NOT NULL,
		is_subscribed integer NOT NULL DEFAULT 1,
		created_at datetime DEFAULT (unixepoch())
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query("CREATE INDEX IF NOT EXISTS idx_subscribers_user ON subscribers (created_by)")
		.execute(&mut *tx)
		.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_subscribers_segment ON subscribers (segment_id, created_by)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
