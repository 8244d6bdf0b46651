/// Entity identities are SQLite `INTEGER PRIMARY KEY` values, scoped per kind.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
