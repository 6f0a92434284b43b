//! Reading an initial data set from JSON.
//!
//! The engine never writes data back; whoever owns the chart persists it.

pub mod file;

pub use file::{load_chart, parse_chart};
