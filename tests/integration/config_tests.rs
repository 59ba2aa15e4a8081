//! 配置加载测试（环境变量覆盖）

use pantry_audit::config::Settings;
use pantry_audit::errors::AppError;
use serial_test::serial;
use std::env;

#[test]
#[serial]
fn test_env_overrides_file_values() {
    env::set_var("PANTRY_SESSION__SESSION_TIMEOUT_MINUTES", "45");
    env::set_var("PANTRY_AUDIT__DEFAULT_PAGE_SIZE", "20");

    let settings = Settings::load();

    env::remove_var("PANTRY_SESSION__SESSION_TIMEOUT_MINUTES");
    env::remove_var("PANTRY_AUDIT__DEFAULT_PAGE_SIZE");

    let settings = assert_ok!(settings);
    assert_eq!(settings.session.session_timeout_minutes, 45);
    assert_eq!(settings.audit.default_page_size, 20);
    assert_eq!(settings.audit.retention_days, 90);
}

#[test]
#[serial]
fn test_invalid_log_format_rejected() {
    env::set_var("PANTRY_LOGGING__FORMAT", "xml");

    let result = Settings::load();

    env::remove_var("PANTRY_LOGGING__FORMAT");

    let err = assert_err!(result);
    assert!(matches!(err, AppError::ConfigError(_)));
}

#[test]
#[serial]
fn test_zero_timeout_rejected() {
    env::set_var("PANTRY_SESSION__SESSION_TIMEOUT_MINUTES", "0");

    let result = Settings::load();

    env::remove_var("PANTRY_SESSION__SESSION_TIMEOUT_MINUTES");

    assert_err!(result);
}
