//! Core of depdump: turning a resolved dependency graph into a JSON report.
//!
//! The [`snapshot`] module defines the read-only graph interface and its
//! file-backed implementation, [`serializer`] walks it with cycle-safe
//! truncation, and [`report`] holds the ordered result and its encodings.
//!
//! This crate is intentionally free of async code and network I/O.

pub mod config;
pub mod report;
pub mod serializer;
pub mod snapshot;
