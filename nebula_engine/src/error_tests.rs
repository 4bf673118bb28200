//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone, std::error::Error).

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("Framebuffer creation failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("Framebuffer creation failed"));
}

#[test]
fn test_out_of_memory_display() {
    let err = Error::OutOfMemory;
    assert_eq!(format!("{}", err), "Out of GPU memory");
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("Compositor framebuffer 42 is unknown".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid resource"));
    assert!(display.contains("framebuffer 42"));
}

#[test]
fn test_initialization_failed_display() {
    let err = Error::InitializationFailed("Resource streamer thread".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Initialization failed"));
    assert!(display.contains("Resource streamer thread"));
}

#[test]
fn test_invalid_asset_display() {
    let err = Error::InvalidAsset("Compositor node format version 8, expected 9".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid asset"));
    assert!(display.contains("expected 9"));
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::OutOfMemory;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug() {
    assert!(format!("{:?}", Error::BackendError("x".to_string())).contains("BackendError"));
    assert!(format!("{:?}", Error::OutOfMemory).contains("OutOfMemory"));
    assert!(format!("{:?}", Error::InvalidResource("x".to_string())).contains("InvalidResource"));
    assert!(format!("{:?}", Error::InitializationFailed("x".to_string())).contains("InitializationFailed"));
    assert!(format!("{:?}", Error::InvalidAsset("x".to_string())).contains("InvalidAsset"));
}

#[test]
fn test_error_clone() {
    let err1 = Error::InvalidAsset("truncated".to_string());
    let err2 = err1.clone();
    assert_eq!(format!("{}", err1), format!("{}", err2));
}

// ============================================================================
// RESULT TYPE TESTS
// ============================================================================

#[test]
fn test_error_propagation_with_question_mark() {
    fn inner() -> Result<u32> {
        Err(Error::InvalidAsset("short read".to_string()))
    }

    fn outer() -> Result<u32> {
        let value = inner()?;
        Ok(value + 1)
    }

    match outer() {
        Err(Error::InvalidAsset(msg)) => assert_eq!(msg, "short read"),
        _ => panic!("Expected InvalidAsset to propagate"),
    }
}

#[test]
fn test_engine_err_macro_builds_backend_error() {
    let err = crate::engine_err!("nebula::tests", "unknown id {}", 7);
    match err {
        Error::BackendError(msg) => assert_eq!(msg, "unknown id 7"),
        _ => panic!("Expected BackendError"),
    }
}

#[test]
fn test_engine_bail_macro_returns_early() {
    fn bails(flag: bool) -> Result<u32> {
        if flag {
            crate::engine_bail!("nebula::tests", "bailing with {}", "reason");
        }
        Ok(1)
    }

    assert!(bails(true).is_err());
    assert_eq!(bails(false).unwrap(), 1);
}
