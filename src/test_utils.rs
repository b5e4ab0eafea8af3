/// # Test Utilities Module
///
/// Fixtures shared by the unit tests: an isolated in-memory database with a
/// small standard schema.

use crate::config::DbConfig;
use crate::core::db::Database;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Routes `tracing` output to the test harness once per test binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Isolated database test fixture
pub struct Fixture {
    pub db: Database,
}

impl Fixture {
    /// Empty in-memory database
    pub fn new() -> Self {
        init_tracing();
        Fixture {
            db: Database::new(DbConfig::in_memory()),
        }
    }

    /// Database with the standard schema and sample rows
    pub fn with_sample_data() -> Self {
        let mut fixture = Self::new();
        fixture
            .db
            .execute_multi(
                "
                CREATE TABLE users (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    score REAL
                );
                INSERT INTO users (name, score) VALUES ('alice', 12.5);
                INSERT INTO users (name, score) VALUES ('bob', 7.25);
                INSERT INTO users (name, score) VALUES ('carol', NULL);

                CREATE TABLE spr (
                    id INTEGER PRIMARY KEY,
                    value TEXT NOT NULL
                );
                INSERT INTO spr (id, value) VALUES (2, 'b');
                INSERT INTO spr (id, value) VALUES (1, 'a');
            ",
            )
            .expect("Failed to create sample schema");
        fixture
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_sample_data_fixture() {
        let mut fixture = Fixture::with_sample_data();
        let count = fixture
            .db
            .scalar_sql("SELECT COUNT(*) FROM sqlite_master WHERE type='table'")
            .unwrap();
        assert_eq!(count, Some(Value::Integer(2)));
    }

    #[test]
    fn test_fixtures_are_isolated() {
        let mut first = Fixture::with_sample_data();
        let mut second = Fixture::new();
        first.db.execute("DELETE FROM users").unwrap();
        assert!(second.db.execute("SELECT * FROM users").is_err());
    }
}
