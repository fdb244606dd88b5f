//! Shared test helpers for integration tests.
//!
//! Note: We use `helpers/mod.rs` instead of the modern `helpers.rs` + `helpers/` pattern
//! because Cargo auto-discovers top-level `.rs` files in `tests/` as integration tests.

#![allow(dead_code)]

pub mod lsp_client;
pub mod service;
pub mod test_fixtures;
