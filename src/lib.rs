//! # speedlog
//!
//! Measures the speed of the internet connection at a fixed interval and appends every result to
//! a CSV log. Measurements that time out or fail are logged too, as rows of `n/a` with a note
//! explaining what went wrong, and the measurements go on.
//!
//! - **`runner`**: the measurement loop
//! - **`deadline`**: bounding a single measurement in time
//! - **`format`**: results to rows
//! - **`store`**: the append-only CSV log
//! - **`progress`**: banner and status line on stdout
//!
//! Configuration lives in `speedlog-config`, the measurement itself in `speedlog-provider`.

#[macro_use]
extern crate tracing;

pub mod deadline;
mod errors;
pub mod format;
pub mod logging;
pub mod progress;
pub mod row;
pub mod runner;
pub mod store;

pub use errors::init_errors;
pub use logging::init_logging;
pub use row::{
    Cell,
    Row,
    NOT_AVAILABLE,
};
pub use runner::{
    CycleOutcome,
    MeasurementLoop,
};
pub use store::LogStore;
