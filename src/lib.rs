//! Source generator for Obara-Saika one-electron integral kernels.
//!
//! The crate expands the vertical recurrence for every requested pair of Cartesian Gaussian
//! shells (S through G) and renders the result as compilable kernel classes, an integral
//! assembly dispatcher and a gradient assembler. Decomposition, storage selection and text
//! emission are separate stages:
//!
//! * [`recurrence`] derives the weighted dependency terms of every component.
//! * [`storage`] decides where each class keeps its values.
//! * [`emit`] spells classes and branches into output sinks.
//! * [`generator`] plans a run from a [`GeneratorConfig`] and drives the other stages.

pub mod config;
pub mod emit;
pub mod error;
pub mod generator;
pub mod recurrence;
pub mod storage;
pub mod table;
pub mod types;

pub use config::{GeneratorConfig, StrategyPreference};
pub use error::GenError;
pub use generator::{EmitOptions, GeneratedSources, Generator, UnitSummary};

use std::sync::OnceLock;

static DEFAULT_CONFIG: OnceLock<GeneratorConfig> = OnceLock::new();

/// The configuration embedded in the library: every pair up to [F|F], dispatched and
/// differentiated.
pub fn get_default_config() -> &'static GeneratorConfig {
    DEFAULT_CONFIG.get_or_init(|| {
        const DEFAULT_CONFIG_TOML: &str = include_str!("../resources/default.toml");
        GeneratorConfig::load_from_str(DEFAULT_CONFIG_TOML)
            .expect("Failed to parse embedded default configuration. This is a library bug.")
    })
}
