//! Custom assertion macros and utilities
//!
//! Provides assertion macros for API responses with more descriptive
//! failure output.

#![allow(unused_macros)]

/// Assert the status of an `axum_test::TestResponse`, printing the body on
/// mismatch
macro_rules! assert_status {
    ($response:expr, $status:expr) => {{
        let response = &$response;
        assert_eq!(
            response.status_code(),
            $status,
            "unexpected status, body: {}",
            response.text()
        );
    }};
}

/// Assert that a JSON error body mentions `needle`
macro_rules! assert_error_contains {
    ($response:expr, $needle:expr) => {{
        let body: serde_json::Value = $response.json();
        let message = body["error"].as_str().unwrap_or_default().to_string();
        assert!(
            message.contains($needle),
            "Expected error '{}' to contain '{}'",
            message,
            $needle
        );
    }};
}
