use crate::types::{Axis, CartesianComponent, ShellPair};
use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all fallible operations in the `oeigen` library.
///
/// Generation is a batch compiler step, so every variant is fatal for the run. Each variant
/// carries enough context (shell pair, component, axis) to locate the offending piece of
/// the dependency graph without re-running the generator under a debugger.
#[derive(Error, Debug)]
pub enum GenError {
    /// An axis decrement was requested on a component whose exponent along that axis is
    /// already zero.
    ///
    /// The recurrence only ever lowers nonzero exponents, so seeing this means the
    /// recursion bookkeeping is broken.
    #[error("cannot lower component {component} along axis {axis}: exponent is already zero")]
    InvalidAxis {
        /// The component that was asked to be lowered.
        component: CartesianComponent,
        /// The axis whose exponent is zero.
        axis: Axis,
    },

    /// A decomposition was requested for the (S,S) pair, which is the externally supplied
    /// base case and has no recurrence.
    #[error("the (S,S) shell pair is the external base case and cannot be decomposed")]
    InvalidBaseCase,

    /// A dispatch or gradient branch was requested for a shell pair that is not part of the
    /// generated set, or that lies above the largest supported shell.
    #[error("shell pair ({bra},{ket}) is not part of the generated set")]
    UnsupportedShellPair {
        /// Degree of the bra shell.
        bra: u8,
        /// Degree of the ket shell.
        ket: u8,
    },

    /// A shell pair was explicitly configured for full register storage but holds more
    /// named values than the register budget allows.
    #[error(
        "shell pair {pair} is configured for full register storage but has {components} components (budget {budget})"
    )]
    StrategyMismatch {
        /// The offending shell pair.
        pair: ShellPair,
        /// Number of integral components the class would keep as named values.
        components: usize,
        /// The configured register budget.
        budget: usize,
    },

    /// A shell degree outside S..G was supplied.
    #[error("shell degree {0} is outside the supported range S..G (0..=4)")]
    InvalidDegree(u8),

    /// A canonical component index outside the shell was supplied.
    #[error("component index {index} is out of range for a shell of degree {degree}")]
    InvalidComponentIndex {
        /// Degree of the shell.
        degree: u8,
        /// The out-of-range index.
        index: usize,
    },

    /// A component was looked up in a shell whose degree differs from the component's own.
    #[error("component {component} does not belong to a shell of degree {degree}")]
    ComponentOutsideShell {
        /// The component that was looked up.
        component: CartesianComponent,
        /// The shell degree it was looked up in.
        degree: u8,
    },

    /// A configured maximum auxiliary order is lower than the dependency graph requires.
    #[error(
        "shell pair {pair} is configured with max auxiliary order {configured} but the dependency graph requires {required}"
    )]
    InsufficientAuxiliaryOrder {
        /// The offending shell pair.
        pair: ShellPair,
        /// The configured order.
        configured: u32,
        /// The order required by the dependency graph.
        required: u32,
    },

    /// The configuration is structurally valid TOML but semantically inconsistent.
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(String),

    /// Formatting generated text into an output sink failed.
    #[error("failed to format generated source: {0}")]
    Emit(#[from] std::fmt::Error),

    /// An I/O error that occurred while reading a configuration file.
    #[error("I/O error at path '{path}': {source}")]
    IoError {
        /// The path of the file that caused the I/O error.
        path: PathBuf,
        /// The underlying `std::io::Error`.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or does not match the expected layout.
    #[error("Failed to deserialize TOML configuration: {0}")]
    DeserializationError(#[from] toml::de::Error),
}
