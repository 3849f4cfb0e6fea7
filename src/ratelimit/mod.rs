//! Admission control algorithms and per-caller state.

mod clock;
mod fixed;
mod limiter;
mod registry;
mod sliding;
mod strategy;

pub use clock::{Clock, ManualClock, SystemClock};
pub use limiter::{AdmissionController, Decision};
pub use registry::LimiterRegistry;
pub use strategy::Strategy;
