//! Registry Integration Tests
//!
//! Lifecycle, concurrency and persistence of the collection registry.

#[path = "../common/mod.rs"]
mod common;

mod persistence;
