//! Input/output helpers.
//!
//! - CSV read + quote-all rewrite (`dataset`)
//! - pre-write backup copy (`backup`)

pub mod backup;
pub mod dataset;

pub use backup::*;
pub use dataset::*;
