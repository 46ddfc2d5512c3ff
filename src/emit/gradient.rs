//! Derivative-integral assembly.
//!
//! Differentiating a Gaussian with respect to its centre shifts its angular momentum by one in
//! either direction, so the gradient branch of (I,J) needs every class one degree away on a
//! single side. The class of (I,J) itself never contributes.

use super::dispatch::{unsupported, write_copy, write_debug_prints};
use crate::error::GenError;
use crate::storage::StorageLayout;
use crate::types::{Shell, ShellPair};
use std::collections::BTreeSet;
use std::fmt::Write;

/// Shell pairs whose m=0 values the gradient of `pair` is composed from.
///
/// Order: (I-1,J) when I > 0, (I,J-1) when J > 0, (I+1,J), (I,J+1).
///
/// # Errors
///
/// Returns `GenError::UnsupportedShellPair` if a raised neighbour lies above G.
pub fn gradient_neighbours(pair: ShellPair) -> Result<Vec<ShellPair>, GenError> {
    let mut neighbours = Vec::with_capacity(4);
    if let Some(bra) = pair.bra.lowered() {
        neighbours.push(ShellPair::new(bra, pair.ket));
    }
    if let Some(ket) = pair.ket.lowered() {
        neighbours.push(ShellPair::new(pair.bra, ket));
    }
    let raise = |shell: Shell| shell.raised().ok_or_else(|| unsupported(pair));
    neighbours.push(ShellPair::new(raise(pair.bra)?, pair.ket));
    neighbours.push(ShellPair::new(pair.bra, raise(pair.ket)?));
    Ok(neighbours)
}

/// Emits the gradient assembler over a fixed set of requested shell pairs.
pub struct GradientAssembler<'a> {
    layout: &'a StorageLayout,
    requested: &'a BTreeSet<ShellPair>,
    debug: bool,
}

impl<'a> GradientAssembler<'a> {
    pub fn new(layout: &'a StorageLayout, requested: &'a BTreeSet<ShellPair>, debug: bool) -> Self {
        Self {
            layout,
            requested,
            debug,
        }
    }

    /// Emits one branch per requested pair, ordered by pair.
    ///
    /// Returns the number of debug prints written for each pair.
    pub fn emit(&self, out: &mut String) -> Result<Vec<(ShellPair, usize)>, GenError> {
        self.requested
            .iter()
            .map(|&pair| Ok((pair, self.emit_branch(pair, out)?)))
            .collect()
    }

    /// Emits the gradient branch of `pair`.
    ///
    /// # Errors
    ///
    /// Returns `GenError::UnsupportedShellPair` if `pair` was not requested, or if one of its
    /// neighbours lies above G or was not generated.
    pub fn emit_branch(&self, pair: ShellPair, out: &mut String) -> Result<usize, GenError> {
        if !self.requested.contains(&pair) {
            return Err(unsupported(pair));
        }
        let neighbours = gradient_neighbours(pair)?;

        writeln!(out)?;
        writeln!(out, "  /* {} integral gradient, m=0 */", pair.label())?;
        writeln!(
            out,
            "  if(I == {} && J == {}){{",
            pair.bra.degree(),
            pair.ket.degree()
        )?;
        let mut prints = 0;
        for neighbour in neighbours {
            writeln!(out)?;
            write_copy(self.layout, neighbour, out)?;
            if self.debug {
                prints += write_debug_prints(neighbour, out)?;
            }
        }
        writeln!(out, "  }}")?;
        Ok(prints)
    }
}
