use super::strategy::StorageStrategy;
use crate::types::ShellPair;
use std::collections::{BTreeMap, BTreeSet};

/// The storage decisions of one generation run.
///
/// Records the strategy of every generated shell pair and which pairs must additionally be
/// emitted as row-partial classes for partial-register consumers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageLayout {
    strategies: BTreeMap<ShellPair, StorageStrategy>,
    row_partial: BTreeSet<ShellPair>,
}

impl StorageLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pair: ShellPair, strategy: StorageStrategy) {
        self.strategies.insert(pair, strategy);
    }

    /// Marks `pair` as read row by row by some partial-register consumer.
    pub fn mark_row_partial(&mut self, pair: ShellPair) {
        self.row_partial.insert(pair);
    }

    pub fn strategy(&self, pair: ShellPair) -> Option<StorageStrategy> {
        self.strategies.get(&pair).copied()
    }

    /// `true` if consumers read `pair` by field name.
    pub fn keeps_named_values(&self, pair: ShellPair) -> bool {
        self.strategy(pair)
            .is_some_and(StorageStrategy::keeps_named_values)
    }

    pub fn is_row_partial(&self, pair: ShellPair) -> bool {
        self.row_partial.contains(&pair)
    }

    pub fn contains(&self, pair: ShellPair) -> bool {
        self.strategies.contains_key(&pair)
    }

    pub fn pairs(&self) -> impl Iterator<Item = (ShellPair, StorageStrategy)> + '_ {
        self.strategies.iter().map(|(&pair, &strategy)| (pair, strategy))
    }
}
