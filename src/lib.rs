//! `enroll-fill` library crate.
//!
//! Fills the `enrolled_count` column of a course CSV with random values bounded
//! by a multiple of each row's `capacity`, then rewrites the file in place after
//! taking a backup.
//!
//! The binary (`enroll-fill`) is a thin wrapper around this library so the
//! sampling and row logic are testable without spawning processes.

pub mod app;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod sampler;
pub mod transform;
