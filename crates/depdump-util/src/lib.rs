//! Shared utilities for depdump.
//!
//! This crate provides the cross-cutting concerns used by the other depdump
//! crates: the error taxonomy, filesystem helpers for writing reports
//! atomically, and Cargo-style status lines.

pub mod errors;
pub mod fs;
pub mod progress;
