//! Property-based tests for store invariants

mod store_model;
