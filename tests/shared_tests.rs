//! The process-wide facade. Everything runs in one test because the shared
//! instance is global to the test binary.

#[cfg(test)]
mod tests {
    use sqlfacade::{shared, DbConfig, FacadeError, Value};

    #[test]
    fn test_shared_database_lifecycle() {
        assert!(shared::close().is_ok());
        assert!(matches!(
            shared::with_database(|db| db.execute("SELECT 1")),
            Err(FacadeError::Config(_))
        ));

        shared::init(DbConfig::in_memory()).unwrap();
        assert!(matches!(
            shared::init(DbConfig::in_memory()),
            Err(FacadeError::Config(_))
        ));

        let first_id = shared::with_database(|db| {
            db.connect()?;
            Ok(db.connection_id())
        })
        .unwrap();
        let second_id = shared::with_database(|db| {
            db.connect()?;
            Ok(db.connection_id())
        })
        .unwrap();
        assert_eq!(first_id, second_id);

        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| shared::with_database(|db| db.scalar_sql("SELECT 1"))))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), Some(Value::Integer(1)));
        }

        shared::close().unwrap();
        let reopened = shared::with_database(|db| Ok(db.connection_id())).unwrap();
        assert_eq!(reopened, None);
    }
}
