//! Unit tests for the Engine logger slot
//!
//! IMPORTANT: LOGGER is a global OnceLock shared across all tests.
//! Tests that swap the logger are marked with #[serial]; other tests may still
//! log concurrently, so captures are filtered by a source tag unique to each test.

use crate::test_support::CapturingLogger;
use crate::nebula::{Engine, Error};
use crate::nebula::log::LogSeverity;
use serial_test::serial;

// ============================================================================
// LOGGING API TESTS
// ============================================================================

#[test]
#[serial]
fn test_default_logger_logs_without_panic() {
    Engine::reset_logger();

    Engine::log(LogSeverity::Info, "nebula::tests", "Test message".to_string());
    Engine::log(LogSeverity::Error, "nebula::tests", "Error message".to_string());
    Engine::log(LogSeverity::Warn, "nebula::tests", "Warning message".to_string());
}

#[test]
#[serial]
fn test_set_custom_logger() {
    let logger = CapturingLogger::new();
    let entries = logger.entries.clone();
    Engine::set_logger(logger);

    Engine::log(LogSeverity::Info, "nebula::tests::custom", "Message 1".to_string());
    Engine::log(LogSeverity::Warn, "nebula::tests::custom", "Message 2".to_string());

    let captured = CapturingLogger::from_source(&entries, "nebula::tests::custom");
    Engine::reset_logger();

    assert_eq!(captured.len(), 2);
    assert_eq!(captured[0].severity, LogSeverity::Info);
    assert_eq!(captured[0].message, "Message 1");
    assert_eq!(captured[1].severity, LogSeverity::Warn);
    assert_eq!(captured[1].message, "Message 2");
}

#[test]
#[serial]
fn test_reset_logger_to_default() {
    let logger = CapturingLogger::new();
    let entries = logger.entries.clone();
    Engine::set_logger(logger);

    Engine::reset_logger();
    Engine::log(LogSeverity::Info, "nebula::tests::reset", "After reset".to_string());

    assert!(CapturingLogger::from_source(&entries, "nebula::tests::reset").is_empty());
}

#[test]
#[serial]
fn test_log_detailed_with_file_line() {
    let logger = CapturingLogger::new();
    let entries = logger.entries.clone();
    Engine::set_logger(logger);

    Engine::log_detailed(
        LogSeverity::Error,
        "nebula::tests::detailed",
        "Detailed error".to_string(),
        "framebuffer_manager.rs",
        42,
    );

    let captured = CapturingLogger::from_source(&entries, "nebula::tests::detailed");
    Engine::reset_logger();

    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].file, Some("framebuffer_manager.rs"));
    assert_eq!(captured[0].line, Some(42));
}

#[test]
#[serial]
fn test_engine_err_logs_before_returning() {
    let logger = CapturingLogger::new();
    let entries = logger.entries.clone();
    Engine::set_logger(logger);

    let err = crate::engine_err!("nebula::tests::err", "Unknown framebuffer {}", 3);

    let captured = CapturingLogger::from_source(&entries, "nebula::tests::err");
    Engine::reset_logger();

    assert!(matches!(err, Error::BackendError(ref msg) if msg == "Unknown framebuffer 3"));
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);
    assert!(captured[0].file.is_some());
}

#[test]
#[serial]
fn test_custom_logger_receives_all_severities() {
    let logger = CapturingLogger::new();
    let entries = logger.entries.clone();
    Engine::set_logger(logger);

    crate::engine_trace!("nebula::tests::all", "Trace");
    crate::engine_debug!("nebula::tests::all", "Debug");
    crate::engine_info!("nebula::tests::all", "Info");
    crate::engine_warn!("nebula::tests::all", "Warn");
    crate::engine_error!("nebula::tests::all", "Error");

    let captured = CapturingLogger::from_source(&entries, "nebula::tests::all");
    Engine::reset_logger();

    let severities: Vec<LogSeverity> = captured.iter().map(|e| e.severity).collect();
    assert_eq!(severities, vec![
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ]);
}
