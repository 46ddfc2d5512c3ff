//! Storage strategy selection per shell pair.
//!
//! A strategy decides where the values of a generated class live: as named fields held for the
//! lifetime of the object, in the shared store buffer, or in the store buffer computed row by
//! row against row-partial dependency objects. The decomposition is identical under all three;
//! only the shape of the emitted code changes.

use crate::config::{GeneratorConfig, StrategyPreference};
use crate::error::GenError;
use crate::recurrence::RecurrenceEngine;
use crate::types::ShellPair;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a generated class keeps its integral components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageStrategy {
    /// Every component is a named field of the class.
    FullRegister,
    /// Components are written to the store; the raise dependency is re-instantiated per bra row.
    PartialRegister,
    /// Components are written to the store; dependencies are instantiated once.
    GlobalStore,
}

impl StorageStrategy {
    /// `true` if consumers read this class's values by field name rather than through the store.
    pub fn keeps_named_values(self) -> bool {
        matches!(self, StorageStrategy::FullRegister)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StorageStrategy::FullRegister => "full_register",
            StorageStrategy::PartialRegister => "partial_register",
            StorageStrategy::GlobalStore => "global_store",
        }
    }
}

impl fmt::Display for StorageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chooses a `StorageStrategy` for each shell pair from the generator configuration.
///
/// Selection depends only on the shell pair and the configuration, so the same configuration
/// always yields the same layout.
pub struct StrategySelector<'c> {
    config: &'c GeneratorConfig,
}

impl<'c> StrategySelector<'c> {
    pub fn new(config: &'c GeneratorConfig) -> Self {
        Self { config }
    }

    /// Selects the strategy for `pair`.
    ///
    /// Explicit per-pair entries win over `default_strategy`. `auto` picks full register
    /// storage when the class fits the register budget and the global store otherwise.
    ///
    /// # Errors
    ///
    /// * `GenError::InvalidBaseCase` for (S,S), which is never generated.
    /// * `GenError::StrategyMismatch` if full register storage is requested explicitly for a
    ///   class larger than the register budget.
    /// * `GenError::InvalidConfig` if partial register storage is requested for a pair whose
    ///   raise dependency is the (S,S) base case, which has no rows to partition.
    pub fn select(
        &self,
        pair: ShellPair,
        engine: &RecurrenceEngine,
    ) -> Result<StorageStrategy, GenError> {
        if pair.is_base() {
            return Err(GenError::InvalidBaseCase);
        }

        let components = pair.component_count();
        let budget = self.config.register_budget;
        let preference = self
            .config
            .strategies
            .get(&pair)
            .copied()
            .unwrap_or(self.config.default_strategy);

        match preference {
            StrategyPreference::Auto if components <= budget => Ok(StorageStrategy::FullRegister),
            StrategyPreference::Auto => Ok(StorageStrategy::GlobalStore),
            StrategyPreference::FullRegister if components > budget => {
                Err(GenError::StrategyMismatch {
                    pair,
                    components,
                    budget,
                })
            }
            StrategyPreference::FullRegister => Ok(StorageStrategy::FullRegister),
            StrategyPreference::PartialRegister => {
                if engine.raise_dependency(pair)?.is_base() {
                    return Err(GenError::InvalidConfig(format!(
                        "{pair} cannot use partial register storage: its raise dependency is the (S,S) base case"
                    )));
                }
                Ok(StorageStrategy::PartialRegister)
            }
            StrategyPreference::GlobalStore => Ok(StorageStrategy::GlobalStore),
        }
    }
}
