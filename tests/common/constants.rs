//! Shared constants for end-to-end tests
//!
//! When test data changes (user credentials, seeded records, etc.),
//! update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Regular test user id
pub const TEST_USER: &str = "testuser";

/// Regular test user password
pub const TEST_PASS: &str = "testpass123";

/// Admin test user id
pub const ADMIN_USER: &str = "admin";

/// Admin test user password
pub const ADMIN_PASS: &str = "adminpass123";

// ============================================================================
// Seeded Inventory
// ============================================================================

/// Artist with two records in the seed inventory
pub const ARTIST_1_NAME: &str = "The Test Band";

/// Artist with one record in the seed inventory
pub const ARTIST_2_NAME: &str = "Jazz Ensemble";

/// Serial of The Test Band's cd record
pub const SERIAL_1: u64 = 1;

/// Serial of The Test Band's vinyl record
pub const SERIAL_2: u64 = 2;

/// Serial of Jazz Ensemble's digital record
pub const SERIAL_3: u64 = 3;

/// Number of records in the seed inventory
pub const SEED_RECORDS_COUNT: usize = 3;

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
