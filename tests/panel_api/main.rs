//! HTTP tests for the panel API.
//!
//! Runs against a SeaORM mock connection, so no MySQL server is needed.
//!
//! Run with: cargo test --test panel_api

mod test_helpers;

mod test_auth;
mod test_backup;
mod test_reports;
mod test_submit;
mod test_tests_listing;
