//! Symbolic Obara-Saika recurrence: decomposition of every integral component into weighted
//! references to lower shell-pair classes.

mod engine;
mod term;

pub use engine::{RecurrenceEngine, reference_raise_side};
pub use term::{
    ClassDecomposition, ComponentRef, Decomposition, DecompositionTerm, Factor, TermKind,
};
