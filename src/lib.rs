//! AXIOMA: business valuation engine.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod format;
pub mod valuation;
pub mod extraction;
pub mod report;
pub mod storage;
pub mod api;
