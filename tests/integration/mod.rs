//! Integration tests for the path-indexed sync state store

mod notifier_integration;
mod replay_integration;
mod shared_store;
mod store_properties;
