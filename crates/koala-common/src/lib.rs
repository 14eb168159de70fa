//! Common utilities for the Koala layout engine.
//!
//! This crate provides shared infrastructure used by the layout crates and
//! the command-line driver:
//! - **Logging** - `tracing` subscriber setup
//! - **Warning System** - deduplicated reports of tolerated contract violations

pub mod logging;
pub mod warning;
