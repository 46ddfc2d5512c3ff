//! Text emission: generated classes, the assembly dispatcher, the gradient assembler and the
//! diagnostic legend.
//!
//! Emitters only spell out what the recurrence engine and the storage layout already decided;
//! they append to caller-owned `String` sinks and never reorder units.

mod class;
mod dispatch;
mod gradient;
mod legend;
pub mod naming;
mod sink;

pub use class::CodeEmitter;
pub use dispatch::AssemblyDispatcher;
pub use gradient::{GradientAssembler, gradient_neighbours};
pub use legend::write_store_legend;
pub use sink::{OutputSinks, UnitBuffer};
