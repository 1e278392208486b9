//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (seed documents, ids, timeouts), update
//! only this file.

// ============================================================================
// Seed Library IDs
// ============================================================================

/// Film id for "The Red Shoes" (1948)
pub const FILM_RED_SHOES_ID: &str = "watchmode:film:1548418";

/// Film id for "Cleo from 5 to 7" (1962)
pub const FILM_CLEO_ID: &str = "watchmode:film:1586594";

/// Film id for "Walkabout" (1971)
pub const FILM_WALKABOUT_ID: &str = "watchmode:film:1616666";

/// Book id for "The Rings of Saturn"
pub const BOOK_RINGS_OF_SATURN_ID: &str = "openlibrary:book:OL7826621M";

// ============================================================================
// Seed Library Metadata
// ============================================================================

/// Film 1 title
pub const FILM_RED_SHOES_TITLE: &str = "The Red Shoes";

/// Film 2 title
pub const FILM_CLEO_TITLE: &str = "Cleo from 5 to 7";

/// Film 3 title
pub const FILM_WALKABOUT_TITLE: &str = "Walkabout";

/// Watchmode title id for "The Red Shoes"
pub const FILM_RED_SHOES_EXTERNAL_ID: &str = "1548418";

/// Watchmode title id for "Cleo from 5 to 7"
pub const FILM_CLEO_EXTERNAL_ID: &str = "1586594";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
