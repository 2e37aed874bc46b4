//! Integration test crate for telestore.
//!
//! This crate has no library code; it only contains tests that open real
//! session databases through the public API and inspect the tables they
//! leave behind.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p telestore-integration-tests
//! ```
