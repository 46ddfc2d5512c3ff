//! Pure data produced by the recurrence engine.
//!
//! A decomposition says *which* lower-order components an integral component depends on and
//! with *which* weights; it says nothing about where values live or how they are spelled in
//! the emitted source. That split lets the algebra be tested without comparing text.

use crate::table;
use crate::types::{Axis, Center, ShellPair, Side};
use std::collections::BTreeSet;
use std::fmt;

/// Identifies one integral component of a shell pair by canonical (shell-local) indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentRef {
    pub pair: ShellPair,
    pub bra: usize,
    pub ket: usize,
}

impl ComponentRef {
    pub fn new(pair: ShellPair, bra: usize, ket: usize) -> Self {
        Self { pair, bra, ket }
    }

    /// Global bra index, as used in store addresses and field names.
    pub fn global_bra(&self) -> usize {
        table::global_index(self.pair.bra, self.bra)
    }

    /// Global ket index, as used in store addresses and field names.
    pub fn global_ket(&self) -> usize {
        table::global_index(self.pair.ket, self.ket)
    }

    /// `true` if this is the (S,S) component evaluated by the external auxiliary primitive.
    pub fn is_base(&self) -> bool {
        self.pair.is_base()
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}|{}]",
            table::label(self.pair.bra, self.bra),
            table::label(self.pair.ket, self.ket)
        )
    }
}

/// The role a term plays in the Obara-Saika vertical recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// Raised side lowered once along the recursion axis.
    Raise,
    /// Raised side lowered twice along the recursion axis.
    SecondLowering,
    /// Both sides lowered once along the recursion axis.
    Cross,
}

/// Weight of a decomposition term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Factor {
    /// `(P - center)_axis * dep^(m) - (P - C)_axis * dep^(m+1)`.
    Displacement { center: Center, axis: Axis },
    /// `multiplier / (2 zeta) * (dep^(m) - dep^(m+1))`.
    InverseTwoZeta { multiplier: u8 },
}

/// One signed, weighted reference to a dependency component.
///
/// Every term reads its dependency at orders `m` and `m + 1`; the factor determines how the
/// two reads are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecompositionTerm {
    pub kind: TermKind,
    pub factor: Factor,
    pub dependency: ComponentRef,
}

/// The full recurrence for one integral component at one auxiliary order.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub target: ComponentRef,
    pub m: u32,
    pub side: Side,
    pub axis: Axis,
    /// Terms in emission order: raise, then second lowering, then cross.
    pub terms: Vec<DecompositionTerm>,
}

impl Decomposition {
    pub fn term(&self, kind: TermKind) -> Option<&DecompositionTerm> {
        self.terms.iter().find(|term| term.kind == kind)
    }
}

/// Decompositions of every component of a shell pair at one auxiliary order, bra-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecomposition {
    pub pair: ShellPair,
    pub m: u32,
    pub side: Side,
    pub components: Vec<Decomposition>,
}

impl ClassDecomposition {
    /// Decompositions of the components in bra row `bra` (canonical index).
    pub fn row(&self, bra: usize) -> &[Decomposition] {
        let width = self.pair.ket.component_count();
        &self.components[bra * width..(bra + 1) * width]
    }

    /// Every shell pair referenced by at least one term, (S,S) included.
    pub fn dependency_pairs(&self) -> BTreeSet<ShellPair> {
        self.components
            .iter()
            .flat_map(|d| d.terms.iter().map(|t| t.dependency.pair))
            .collect()
    }

    /// Shell pairs referenced by terms of the given kind.
    pub fn dependency_pairs_of(&self, kind: TermKind) -> BTreeSet<ShellPair> {
        self.components
            .iter()
            .flat_map(|d| d.terms.iter())
            .filter(|t| t.kind == kind)
            .map(|t| t.dependency.pair)
            .collect()
    }
}
