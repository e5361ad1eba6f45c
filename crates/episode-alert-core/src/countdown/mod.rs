//! Air-date countdowns.
//!
//! `calculate_time_left` derives a day/hour/minute/second breakdown from a
//! target timestamp and the current instant. `Countdown` re-runs it on a
//! fixed period in a background task and publishes every result on a watch
//! channel until it is cancelled or dropped.

pub mod ticker;
pub mod time_left;

pub use ticker::Countdown;
pub use time_left::{calculate_time_left, parse_air_date, time_left_between, TimeLeft};
