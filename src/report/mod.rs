//! Terminal reporting for a fill run.

pub mod format;

pub use format::*;
