//! Versioned schema migrations for the tally SQLite store.
//!
//! `PRAGMA user_version` records how many entries of [`MIGRATIONS`] have
//! been applied. [`migrate`] runs once at open time and applies the pending
//! tail, each step in its own transaction; request handling never issues
//! DDL.

/// Connection-level settings, applied on every open.
///
/// `journal_mode` cannot change inside a transaction, so these stay outside
/// the migration steps.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// One entry per schema version; entry `n` migrates version `n` to `n + 1`.
/// Applied entries are never edited — schema changes append a new entry.
pub const MIGRATIONS: &[&str] = &[
  // v1 — tag registry, raw visit log, daily aggregates.
  "
  CREATE TABLE tags (
      tag_id  INTEGER PRIMARY KEY,
      tag     TEXT NOT NULL UNIQUE
  );

  -- One row per observed visit, appended unconditionally.
  CREATE TABLE visits (
      visit_id    INTEGER PRIMARY KEY,
      tag_id      INTEGER NOT NULL REFERENCES tags(tag_id),
      visited_at  TEXT NOT NULL,   -- civil date+time, fixed UTC+8
      visited_on  TEXT NOT NULL    -- civil date of visited_at
  );

  CREATE INDEX visits_tag_day_idx ON visits(tag_id, visited_on);

  -- Compacted visit counts, unique per (tag, civil date).
  CREATE TABLE daily_hits (
      tag_id  INTEGER NOT NULL REFERENCES tags(tag_id),
      day     TEXT NOT NULL,
      hits    INTEGER NOT NULL,
      PRIMARY KEY (tag_id, day)
  );
  ",
  // v2 — per-tag compaction stamp; NULL means never compacted.
  "ALTER TABLE tags ADD COLUMN last_compacted_on TEXT;",
];

/// Apply any pending migrations and return the resulting schema version.
///
/// A database already past the newest known version is left untouched; the
/// caller decides whether that is an error.
pub fn migrate(conn: &mut rusqlite::Connection) -> rusqlite::Result<i64> {
  let mut version: i64 =
    conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

  while (version as usize) < MIGRATIONS.len() {
    let tx = conn.transaction()?;
    tx.execute_batch(MIGRATIONS[version as usize])?;
    tx.pragma_update(None, "user_version", version + 1)?;
    tx.commit()?;
    version += 1;
  }

  Ok(version)
}
