use access_lifecycle::logging::{LogConfig, LoggingError, LoggingSystem};

#[test]
fn test_existing_logger_leaves_config_unset() {
    env_logger::builder().is_test(true).try_init().unwrap();

    let config = LogConfig {
        default_level: "DEBUG".to_string(),
        ..LogConfig::default()
    };
    assert!(matches!(
        LoggingSystem::init(&config),
        Err(LoggingError::AlreadyInitialized)
    ));
    assert!(LoggingSystem::current_config().is_none());
}
