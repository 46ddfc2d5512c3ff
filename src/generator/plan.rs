//! Dependency planning of a generation run.
//!
//! Starting from the requested dispatch and gradient branches, the planner collects every shell
//! pair that must be generated, the deepest auxiliary order each one is read at, its storage
//! strategy and a dependency-before-dependent emission order.

use crate::config::GeneratorConfig;
use crate::emit::gradient_neighbours;
use crate::error::GenError;
use crate::recurrence::RecurrenceEngine;
use crate::storage::{StorageLayout, StorageStrategy, StrategySelector, required_store_dim};
use crate::types::{Shell, ShellPair, Side};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// One shell pair scheduled for generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedUnit {
    pub pair: ShellPair,
    /// Classes are generated for m = 0..=max_m.
    pub max_m: u32,
    pub strategy: StorageStrategy,
    pub side: Side,
    /// Whether row-partial classes of this pair are emitted as well.
    pub row_partial: bool,
}

/// The complete schedule of a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationPlan {
    /// Units in emission order: ascending total degree, then (bra, ket).
    pub units: Vec<PlannedUnit>,
    pub layout: StorageLayout,
    /// Pairs receiving an assembly dispatcher branch.
    pub dispatch: BTreeSet<ShellPair>,
    /// Pairs receiving a gradient assembler branch.
    pub gradient: BTreeSet<ShellPair>,
    /// Largest shell degree any emitted class or branch touches.
    pub max_degree: u8,
}

impl GenerationPlan {
    pub fn unit(&self, pair: ShellPair) -> Option<&PlannedUnit> {
        self.units.iter().find(|unit| unit.pair == pair)
    }

    /// Total number of classes the plan emits, row-partial classes included.
    pub fn class_count(&self) -> usize {
        self.units.iter().map(PlannedUnit::class_count).sum()
    }
}

impl PlannedUnit {
    pub fn class_count(&self) -> usize {
        let orders = self.max_m as usize + 1;
        let rows = if self.row_partial {
            self.pair.bra.component_count()
        } else {
            0
        };
        orders * (1 + rows)
    }
}

/// Builds the generation plan for `config`.
///
/// # Errors
///
/// * `GenError::UnsupportedShellPair` if a gradient branch needs a neighbour above G.
/// * `GenError::InsufficientAuxiliaryOrder` if an explicit maximum order is too shallow.
/// * `GenError::InvalidConfig` if `store_dim` cannot hold every generated component.
/// * Any error of strategy selection.
pub fn build_plan(
    config: &GeneratorConfig,
    engine: &mut RecurrenceEngine,
) -> Result<GenerationPlan, GenError> {
    let dispatch: BTreeSet<ShellPair> = config.dispatch.iter().copied().collect();
    let gradient: BTreeSet<ShellPair> = config.gradient.iter().copied().collect();

    let mut required: BTreeMap<ShellPair, u32> = BTreeMap::new();
    let mut touched: BTreeSet<ShellPair> = dispatch.union(&gradient).copied().collect();
    for &pair in &dispatch {
        if !pair.is_base() {
            required.insert(pair, 0);
        }
    }
    for &pair in &gradient {
        for neighbour in gradient_neighbours(pair)? {
            touched.insert(neighbour);
            if !neighbour.is_base() {
                required.insert(neighbour, 0);
            }
        }
    }

    // Dependencies always have a smaller total degree, so walking totals downwards sees every
    // consumer of a pair before the pair itself.
    let mut resolved: BTreeMap<ShellPair, u32> = BTreeMap::new();
    for total in (1..=2 * Shell::MAX_DEGREE).rev() {
        let level: Vec<(ShellPair, u32)> = required
            .iter()
            .filter(|(pair, _)| pair.total_degree() == total)
            .map(|(&pair, &m)| (pair, m))
            .collect();
        for (pair, needed) in level {
            let max_m = match config.max_auxiliary_order.get(&pair) {
                Some(&configured) if configured < needed => {
                    return Err(GenError::InsufficientAuxiliaryOrder {
                        pair,
                        configured,
                        required: needed,
                    });
                }
                Some(&configured) => configured,
                None => needed,
            };
            resolved.insert(pair, max_m);
            for dependency in engine.dependencies(pair)? {
                if dependency.is_base() {
                    continue;
                }
                let entry = required.entry(dependency).or_insert(0);
                *entry = (*entry).max(max_m + 1);
            }
        }
    }

    for pair in config.max_auxiliary_order.keys() {
        if !resolved.contains_key(pair) {
            debug!(%pair, "ignoring max auxiliary order of a pair that is not generated");
        }
    }

    let selector = StrategySelector::new(config);
    let mut layout = StorageLayout::new();
    for &pair in resolved.keys() {
        layout.insert(pair, selector.select(pair, engine)?);
    }
    let partial_consumers: Vec<ShellPair> = layout
        .pairs()
        .filter(|&(_, strategy)| strategy == StorageStrategy::PartialRegister)
        .map(|(pair, _)| pair)
        .collect();
    for consumer in partial_consumers {
        layout.mark_row_partial(engine.raise_dependency(consumer)?);
    }

    let mut units = Vec::with_capacity(resolved.len());
    for (&pair, &max_m) in &resolved {
        let strategy = layout.strategy(pair).ok_or_else(|| {
            GenError::InvalidConfig(format!("no storage strategy selected for {}", pair))
        })?;
        let unit = PlannedUnit {
            pair,
            max_m,
            strategy,
            side: engine.raise_side(pair)?,
            row_partial: layout.is_row_partial(pair),
        };
        debug!(
            %pair,
            max_m,
            %strategy,
            side = %unit.side,
            row_partial = unit.row_partial,
            "planned shell pair"
        );
        units.push(unit);
    }
    units.sort_by_key(|unit| (unit.pair.total_degree(), unit.pair));

    touched.extend(resolved.keys().copied());
    let max_degree = touched
        .iter()
        .map(|pair| pair.bra.degree().max(pair.ket.degree()))
        .max()
        .unwrap_or(0);
    let needed_dim = required_store_dim(max_degree);
    if config.store_dim < needed_dim {
        return Err(GenError::InvalidConfig(format!(
            "store_dim {} cannot hold shells up to degree {} (needs at least {})",
            config.store_dim, max_degree, needed_dim
        )));
    }

    Ok(GenerationPlan {
        units,
        layout,
        dispatch,
        gradient,
        max_degree,
    })
}
