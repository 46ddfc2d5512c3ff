//! This module implements the `Generator`, the entry point of a generation run.
//!
//! The generator plans the run from a `GeneratorConfig`, decomposes every planned shell pair at
//! every auxiliary order it is read at, and renders the classes, the assembly dispatcher and the
//! gradient assembler into a fresh set of output sinks. Each shell pair is buffered separately
//! and flushed only once all of its classes rendered, so a failing run never leaves a half
//! written unit behind in the returned text.

use super::options::EmitOptions;
use super::plan::{GenerationPlan, build_plan};
use crate::config::GeneratorConfig;
use crate::emit::{
    AssemblyDispatcher, CodeEmitter, GradientAssembler, OutputSinks, UnitBuffer,
    naming, write_store_legend,
};
use crate::error::GenError;
use crate::recurrence::RecurrenceEngine;
use crate::storage::StorageStrategy;
use crate::types::{ShellPair, Side};
use std::fmt::Write;
use tracing::{debug, info};

/// Per-pair record of what a run emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitSummary {
    pub pair: ShellPair,
    pub strategy: StorageStrategy,
    pub max_m: u32,
    pub side: Side,
    /// Integral components per class.
    pub components: usize,
    /// Classes emitted for the pair, row-partial classes included.
    pub classes: usize,
}

/// The output of a successful generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSources {
    pub sinks: OutputSinks,
    /// One entry per generated shell pair, in emission order.
    pub summary: Vec<UnitSummary>,
}

/// Generates one-electron integral kernels from a configuration.
pub struct Generator<'c> {
    /// The build configuration: requested branches, strategies, orders and directions.
    config: &'c GeneratorConfig,
    /// Spelling of qualifier and scalar type in the emitted text.
    options: EmitOptions,
}

impl<'c> Generator<'c> {
    /// Creates a new `Generator` with default emission options.
    ///
    /// # Examples
    ///
    /// ```
    /// use oeigen::{Generator, GeneratorConfig};
    ///
    /// let config = GeneratorConfig::load_from_str(r#"dispatch = ["PS"]"#).unwrap();
    /// let sources = Generator::new(&config).generate().unwrap();
    /// assert!(sources.sinks.declarations.contains("class PSint_0{"));
    /// ```
    pub fn new(config: &'c GeneratorConfig) -> Self {
        Self {
            config,
            options: EmitOptions::default(),
        }
    }

    /// Replaces the emission options.
    pub fn with_options(mut self, options: EmitOptions) -> Self {
        self.options = options;
        self
    }

    /// Plans the run without emitting any text.
    ///
    /// # Errors
    ///
    /// Propagates every planning error; see [`build_plan`].
    pub fn plan(&self) -> Result<GenerationPlan, GenError> {
        let mut engine = self.engine()?;
        build_plan(self.config, &mut engine)
    }

    /// Runs the full generation.
    ///
    /// # Errors
    ///
    /// Fails fast on the first invariant violation or configuration error; no partial output is
    /// returned.
    pub fn generate(&self) -> Result<GeneratedSources, GenError> {
        let mut engine = self.engine()?;
        let plan = build_plan(self.config, &mut engine)?;
        info!(
            units = plan.units.len(),
            classes = plan.class_count(),
            dispatch = plan.dispatch.len(),
            gradient = plan.gradient.len(),
            "generating one-electron integral kernels"
        );

        let mut sinks = OutputSinks::new(self.config.debug);
        let emitter = CodeEmitter::new(&plan.layout, &self.options);
        emitter.emit_prelude(self.config.store_dim, &mut sinks.declarations)?;

        let mut summary = Vec::with_capacity(plan.units.len());
        for unit in &plan.units {
            let mut buffer = UnitBuffer::new();
            let mut classes = 0;
            for m in 0..=unit.max_m {
                let class = engine.decompose_class(unit.pair, m)?;
                emitter.emit_class(&class, &mut buffer.declarations, &mut buffer.definitions)?;
                classes += 1;
            }
            if unit.row_partial {
                for m in 0..=unit.max_m {
                    let class = engine.decompose_class(unit.pair, m)?;
                    for row in 0..unit.pair.bra.component_count() {
                        emitter.emit_row_class(
                            &class,
                            row,
                            &mut buffer.declarations,
                            &mut buffer.definitions,
                        )?;
                        classes += 1;
                    }
                }
            }
            sinks.flush_unit(buffer);
            debug!(pair = %unit.pair, classes, "flushed shell pair");

            summary.push(UnitSummary {
                pair: unit.pair,
                strategy: unit.strategy,
                max_m: unit.max_m,
                side: unit.side,
                components: unit.pair.component_count(),
                classes,
            });
        }

        let debug = self.config.debug;
        let assembly_prints = AssemblyDispatcher::new(&plan.layout, &plan.dispatch, debug)
            .emit(&mut sinks.assembly)?;
        let gradient_prints = GradientAssembler::new(&plan.layout, &plan.gradient, debug)
            .emit(&mut sinks.gradient)?;

        if let Some(debug_stream) = sinks.debug.as_mut() {
            write_store_legend(plan.max_degree, debug_stream)?;
            writeln!(debug_stream)?;
            writeln!(debug_stream, "// debug print points, guarded by {}", naming::DEBUG_MACRO)?;
            for (stream, prints) in [("assembly", &assembly_prints), ("gradient", &gradient_prints)] {
                for (pair, count) in prints {
                    writeln!(
                        debug_stream,
                        "{} {} I={} J={}: {} prints",
                        stream,
                        pair,
                        pair.bra.degree(),
                        pair.ket.degree(),
                        count
                    )?;
                }
            }
        }

        info!(
            declarations = sinks.declarations.len(),
            definitions = sinks.definitions.len(),
            "generation complete"
        );
        Ok(GeneratedSources { sinks, summary })
    }

    fn engine(&self) -> Result<RecurrenceEngine, GenError> {
        RecurrenceEngine::new().with_raise_sides(
            self.config
                .raise_side
                .iter()
                .map(|(&pair, &side)| (pair, side)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyPreference;
    use crate::types::Shell;

    fn pair(bra: Shell, ket: Shell) -> ShellPair {
        ShellPair::new(bra, ket)
    }

    #[test]
    fn ps_run_emits_prelude_classes_and_branch() {
        let mut config = GeneratorConfig::new();
        config.dispatch = vec![pair(Shell::P, Shell::S)];
        let sources = Generator::new(&config).generate().unwrap();

        assert!(sources.sinks.declarations.starts_with("#ifndef STOREDIM"));
        assert!(sources.sinks.declarations.contains("class PSint_0{"));
        assert!(!sources.sinks.declarations.contains("PSint_1"));
        assert!(sources.sinks.assembly.contains("if(I == 1 && J == 0){"));
        assert!(sources.sinks.gradient.is_empty());
        assert!(sources.sinks.debug.is_none());
        assert_eq!(sources.summary.len(), 1);
        assert_eq!(sources.summary[0].classes, 1);
    }

    #[test]
    fn dependencies_are_defined_before_their_consumers() {
        let mut config = GeneratorConfig::new();
        config.dispatch = vec![pair(Shell::D, Shell::P)];
        let sources = Generator::new(&config).generate().unwrap();
        let defs = &sources.sinks.definitions;

        let position = |name: &str| defs.find(&format!("{}::{}", name, name)).unwrap();
        assert!(position("PSint_2") < position("DSint_1"));
        assert!(position("DSint_1") < position("DPint_0"));
        assert!(position("PSint_0") < position("DPint_0"));
    }

    #[test]
    fn custom_options_change_only_spelling() {
        let mut config = GeneratorConfig::new();
        config.dispatch = vec![pair(Shell::P, Shell::P)];
        let options = EmitOptions {
            qualifier: String::new(),
            scalar: "double".to_string(),
        };
        let plain = Generator::new(&config).generate().unwrap();
        let custom = Generator::new(&config).with_options(options).generate().unwrap();

        assert!(custom.sinks.definitions.contains("\nPPint_0::PPint_0(double PAx"));
        assert!(!custom.sinks.definitions.contains("__device__"));
        assert_eq!(
            plain.sinks.definitions.matches(" = ").count(),
            custom.sinks.definitions.matches(" = ").count()
        );
    }

    #[test]
    fn debug_run_fills_the_debug_stream() {
        let mut config = GeneratorConfig::new();
        config.debug = true;
        config.dispatch = vec![pair(Shell::P, Shell::S)];
        config.gradient = vec![pair(Shell::S, Shell::S)];
        let sources = Generator::new(&config).generate().unwrap();
        let debug_stream = sources.sinks.debug.unwrap();

        assert!(debug_stream.contains("[Px|S]"));
        assert!(debug_stream.contains("assembly [P|S] I=1 J=0: 3 prints"));
        assert!(debug_stream.contains("gradient [S|S] I=0 J=0: 6 prints"));
        assert!(sources.sinks.assembly.contains("#ifdef DEBUG_OEI"));
    }

    #[test]
    fn partial_register_run_emits_row_classes_of_the_raise_dependency() {
        let mut config = GeneratorConfig::new();
        config.dispatch = vec![pair(Shell::D, Shell::D)];
        config
            .strategies
            .insert(pair(Shell::D, Shell::D), StrategyPreference::PartialRegister);
        let sources = Generator::new(&config).generate().unwrap();
        let decls = &sources.sinks.declarations;

        assert!(decls.contains("class DPint_0_1{"));
        assert!(decls.contains("class DPint_1_6{"));
        let dp_full = decls.find("class DPint_0{").unwrap();
        let dp_row = decls.find("class DPint_0_1{").unwrap();
        let dd = decls.find("class DDint_0{").unwrap();
        assert!(dp_full < dp_row && dp_row < dd);
    }

    #[test]
    fn invalid_raise_override_fails_before_emitting() {
        let mut config = GeneratorConfig::new();
        config.dispatch = vec![pair(Shell::S, Shell::P)];
        config.raise_side.insert(pair(Shell::S, Shell::P), Side::Bra);
        assert!(matches!(
            Generator::new(&config).generate(),
            Err(GenError::InvalidConfig(_))
        ));
    }
}
