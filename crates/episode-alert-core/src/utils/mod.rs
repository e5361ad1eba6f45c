//! Utility functions for formatting and file persistence.

pub mod format;
pub mod fs;

// Re-export commonly used functions at module level
pub use format::{format_air_date, pad2, truncate_string};
pub use fs::write_atomic;
