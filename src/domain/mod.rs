//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - run configuration (`FillConfig`, `RatioRange`)
//! - the in-memory dataset (`Header`, `Row`, `Dataset`)
//! - per-run counters (`EnrollmentStats`)

pub mod types;

pub use types::*;
