//! Parametric FSI study runner
//!
//! Command-line front end over `fsisweep_core`: option handling, logging setup,
//! and mapping of study outcomes to process exit codes.

pub mod app;
pub mod logging;

pub use app::{Action, Options, Outcome, run};
pub use logging::init_logging;
