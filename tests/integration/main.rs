//! Integration test harness.

mod engine_properties;
mod mock_collaborators;
mod store_history;
