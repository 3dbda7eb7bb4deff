// Module declarations for the library crate.

pub mod analysis;
pub mod batch;
pub mod cli;
pub mod config;
pub mod controls;
pub mod render;
pub mod replay;
pub mod telemetry;
pub mod util;

// Re-export the core pipeline types for convenience, e.g., for tests or external users.
pub use analysis::{analyze, hold_samples, project, Analysis, ControlReport, Histogram, KeyFrame, Report};
pub use controls::{ControlSelector, Input, InputSet};
pub use replay::{RawFrame, Replay};
