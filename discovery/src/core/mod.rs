//! Deterministic, pure logic for building target groups.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! instance snapshots and return deterministic outputs suitable for tests.

pub mod grouping;
pub mod health;
pub mod keys;
pub mod serialize;
pub mod tag_spec;
pub mod types;
