//! Shared constants for end-to-end tests
//!
//! When test data or credentials change, update only this file.

// ============================================================================
// Test Credentials
// ============================================================================

/// The only identity the test server issues tokens for
pub const TEST_USER: &str = "aliceuser";

/// Signing secret of the test server
pub const TEST_SECRET: &str = "e2e-signing-secret";

/// An identity the test server refuses
pub const OTHER_USER: &str = "mallory";

// ============================================================================
// Test Catalog
// ============================================================================

/// Id of "Kota Factory" in the sample catalog
pub const SHOW_1_ID: i64 = 101;

/// Id of "The Ring" in the sample catalog
pub const SHOW_2_ID: i64 = 102;

/// Id of "Ringu" in the sample catalog
pub const SHOW_3_ID: i64 = 103;

/// Id of "Rope" in the sample catalog
pub const SHOW_4_ID: i64 = 104;

/// Number of shows in the sample catalog
pub const SAMPLE_SHOWS_COUNT: usize = 4;

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
