//! The Obara-Saika vertical recurrence, expressed once for every shell pair.
//!
//! For a target component the engine raises one side (fixed per shell pair) along the first
//! axis with a nonzero exponent `n` in that side's triple and produces up to three terms:
//!
//! ```text
//! [a+1|b]^(m) = PX_k [a|b]^(m) - PC_k [a|b]^(m+1)
//!             + (n-1)/(2 zeta) ([a-1|b]^(m) - [a-1|b]^(m+1))     if n > 1
//!             + n_b/(2 zeta)   ([a|b-1]^(m) - [a|b-1]^(m+1))     if the other side has n_b > 0
//! ```
//!
//! Every dependency has a strictly smaller total degree, so unwinding always reaches (S,S).

use super::term::{
    ClassDecomposition, ComponentRef, Decomposition, DecompositionTerm, Factor, TermKind,
};
use crate::error::GenError;
use crate::table;
use crate::types::{CartesianComponent, Shell, ShellPair, Side};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use tracing::debug;

/// Recursion direction used by the reference kernels for each shell pair.
///
/// The default is the ket side whenever it carries angular momentum. [D|F] raises the bra
/// instead, which the reference numerics depend on.
pub fn reference_raise_side(pair: ShellPair) -> Side {
    match (pair.bra, pair.ket) {
        (Shell::D, Shell::F) => Side::Bra,
        (_, Shell::S) => Side::Bra,
        _ => Side::Ket,
    }
}

/// Derives and memoizes decompositions keyed by (shell pair, auxiliary order).
#[derive(Debug, Default)]
pub struct RecurrenceEngine {
    overrides: HashMap<ShellPair, Side>,
    cache: HashMap<(ShellPair, u32), Rc<ClassDecomposition>>,
}

impl RecurrenceEngine {
    /// Creates an engine using the reference recursion directions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the recursion direction of selected shell pairs.
    ///
    /// # Errors
    ///
    /// Returns `GenError::InvalidConfig` if an override names (S,S) or a side without
    /// angular momentum.
    pub fn with_raise_sides(
        mut self,
        overrides: impl IntoIterator<Item = (ShellPair, Side)>,
    ) -> Result<Self, GenError> {
        for (pair, side) in overrides {
            if pair.shell(side) == Shell::S {
                return Err(GenError::InvalidConfig(format!(
                    "cannot raise the {side} side of {pair}: it is an S shell"
                )));
            }
            self.overrides.insert(pair, side);
        }
        self.cache.clear();
        Ok(self)
    }

    /// The side raised when decomposing components of `pair`.
    ///
    /// # Errors
    ///
    /// Returns `GenError::InvalidBaseCase` for (S,S).
    pub fn raise_side(&self, pair: ShellPair) -> Result<Side, GenError> {
        if pair.is_base() {
            return Err(GenError::InvalidBaseCase);
        }
        Ok(self
            .overrides
            .get(&pair)
            .copied()
            .unwrap_or_else(|| reference_raise_side(pair)))
    }

    /// The shell pair referenced by the raise term of every component of `pair`.
    pub fn raise_dependency(&self, pair: ShellPair) -> Result<ShellPair, GenError> {
        let side = self.raise_side(pair)?;
        lower_pair(pair, side, 1, 0)
    }

    /// Decomposes one component of `pair` at auxiliary order `m`.
    ///
    /// # Errors
    ///
    /// Returns `GenError::InvalidBaseCase` for (S,S), `GenError::InvalidComponentIndex` for
    /// out-of-range indices, and propagates `GenError::InvalidAxis` should the lowering
    /// bookkeeping ever go wrong.
    pub fn decompose_component(
        &self,
        pair: ShellPair,
        bra: usize,
        ket: usize,
        m: u32,
    ) -> Result<Decomposition, GenError> {
        let side = self.raise_side(pair)?;
        let bra_triple = table::triple_of(pair.bra.degree(), bra)?;
        let ket_triple = table::triple_of(pair.ket.degree(), ket)?;
        let (raised, other) = match side {
            Side::Bra => (bra_triple, ket_triple),
            Side::Ket => (ket_triple, bra_triple),
        };

        let axis = raised
            .first_nonzero_axis()
            .ok_or(GenError::InvalidBaseCase)?;
        let n = raised.exponent(axis);
        let mut terms = Vec::with_capacity(3);

        let raised_once = table::lower_axis(raised, axis)?;
        terms.push(DecompositionTerm {
            kind: TermKind::Raise,
            factor: Factor::Displacement {
                center: side.center(),
                axis,
            },
            dependency: component_ref(lower_pair(pair, side, 1, 0)?, side, raised_once, other)?,
        });

        if n > 1 {
            let raised_twice = table::lower_axis(raised_once, axis)?;
            terms.push(DecompositionTerm {
                kind: TermKind::SecondLowering,
                factor: Factor::InverseTwoZeta { multiplier: n - 1 },
                dependency: component_ref(
                    lower_pair(pair, side, 2, 0)?,
                    side,
                    raised_twice,
                    other,
                )?,
            });
        }

        let n_other = other.exponent(axis);
        if n_other > 0 {
            let other_once = table::lower_axis(other, axis)?;
            terms.push(DecompositionTerm {
                kind: TermKind::Cross,
                factor: Factor::InverseTwoZeta { multiplier: n_other },
                dependency: component_ref(
                    lower_pair(pair, side, 1, 1)?,
                    side,
                    raised_once,
                    other_once,
                )?,
            });
        }

        Ok(Decomposition {
            target: ComponentRef::new(pair, bra, ket),
            m,
            side,
            axis,
            terms,
        })
    }

    /// Decomposes every component of `pair` at order `m`, bra-major, memoized.
    pub fn decompose_class(
        &mut self,
        pair: ShellPair,
        m: u32,
    ) -> Result<Rc<ClassDecomposition>, GenError> {
        if let Some(hit) = self.cache.get(&(pair, m)) {
            return Ok(Rc::clone(hit));
        }

        let side = self.raise_side(pair)?;
        let mut components = Vec::with_capacity(pair.component_count());
        for bra in 0..pair.bra.component_count() {
            for ket in 0..pair.ket.component_count() {
                components.push(self.decompose_component(pair, bra, ket, m)?);
            }
        }
        debug!(%pair, m, %side, components = components.len(), "decomposed shell pair");

        let class = Rc::new(ClassDecomposition {
            pair,
            m,
            side,
            components,
        });
        self.cache.insert((pair, m), Rc::clone(&class));
        Ok(class)
    }

    /// Distinct shell pairs (S,S) included that any component of `pair` depends on.
    pub fn dependencies(&mut self, pair: ShellPair) -> Result<BTreeSet<ShellPair>, GenError> {
        Ok(self.decompose_class(pair, 0)?.dependency_pairs())
    }

    /// Number of memoized (pair, order) entries.
    pub fn cached_classes(&self) -> usize {
        self.cache.len()
    }
}

/// `pair` with the raised side lowered by `raised_by` and the other side by `other_by`.
fn lower_pair(
    pair: ShellPair,
    side: Side,
    raised_by: u8,
    other_by: u8,
) -> Result<ShellPair, GenError> {
    let lower = |shell: Shell, by: u8| {
        shell
            .degree()
            .checked_sub(by)
            .ok_or(GenError::InvalidBaseCase)
            .and_then(Shell::from_degree)
    };
    let raised = lower(pair.shell(side), raised_by)?;
    let other = lower(pair.shell(side.other()), other_by)?;
    Ok(match side {
        Side::Bra => ShellPair::new(raised, other),
        Side::Ket => ShellPair::new(other, raised),
    })
}

fn component_ref(
    pair: ShellPair,
    side: Side,
    raised: CartesianComponent,
    other: CartesianComponent,
) -> Result<ComponentRef, GenError> {
    let (bra, ket) = match side {
        Side::Bra => (raised, other),
        Side::Ket => (other, raised),
    };
    Ok(ComponentRef::new(
        pair,
        table::canonical_index(pair.bra.degree(), bra)?,
        table::canonical_index(pair.ket.degree(), ket)?,
    ))
}
