//! cyclepacer: a physics-based performance pacing planner for cycling
//! courses.
//!
//! The numerical core lives in [`physics`], [`rider`], [`pacing`],
//! [`integrator`], [`simulator`], and [`optimizer`]. Everything else in this
//! crate is a thin collaborator around that core: course/rider/physics
//! import, result export, configuration, and logging.

pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod integrator;
pub mod logging;
pub mod models;
pub mod optimizer;
pub mod pacing;
pub mod physics;
pub mod rider;
pub mod simulator;

pub use error::{PacerError, Result};
pub use models::{EnvironmentVector, FailureKind, Segment, SimulationResult, SimulationTracePoint};
pub use optimizer::Optimizer;
pub use pacing::Strategy;
pub use physics::PhysicsParams;
pub use rider::{RiderProfile, RiderState};
pub use simulator::Simulator;
