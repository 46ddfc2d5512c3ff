//! This module contains the generation driver of the `oeigen` library.
//!
//! It includes the `Generator`, the dependency planner it runs first, and the `EmitOptions`
//! controlling how the emitted kernels are spelled.

mod implementation;
mod options;
mod plan;

pub use implementation::{GeneratedSources, Generator, UnitSummary};
pub use options::EmitOptions;
pub use plan::{GenerationPlan, PlannedUnit, build_plan};
