//! Identifiers and read expressions shared by every emitter.
//!
//! Classes are named by (shell pair, auxiliary order) alone, so any consumer can refer to a
//! dependency without knowing who emitted it.

use crate::table;
use crate::types::{Axis, Center, ShellPair};

/// Preprocessor symbol guarding every diagnostic print.
pub const DEBUG_MACRO: &str = "DEBUG_OEI";

/// Class generated for `pair` at auxiliary order `m`, e.g. `DPint_1`.
pub fn class_name(pair: ShellPair, m: u32) -> String {
    format!("{}int_{}", pair.label(), m)
}

/// Row-partial class holding bra row `row` (canonical, 0-based) of `pair`, e.g. `DPint_0_1`.
pub fn row_class_name(pair: ShellPair, m: u32, row: usize) -> String {
    format!("{}int_{}_{}", pair.label(), m, row + 1)
}

/// Local object holding `pair` at order `m` inside a generated body, e.g. `dp_1`.
pub fn object_name(pair: ShellPair, m: u32) -> String {
    format!("{}_{}", pair.label().to_lowercase(), m)
}

/// Local object holding the m=0 class of `pair` inside an assembly branch, e.g. `dp`.
pub fn branch_object_name(pair: ShellPair) -> String {
    pair.label().to_lowercase()
}

/// Named field of component (`bra`, `ket`), both global indices.
pub fn field_name(bra: usize, ket: usize) -> String {
    format!("x_{}_{}", bra, ket)
}

/// The externally supplied (S,S) auxiliary value at order `m`.
pub fn base_read(m: u32) -> String {
    format!("VY(0, 0, {})", m)
}

/// Store-buffer access of component (`bra`, `ket`) at order `m`.
pub fn store_full(bra: usize, ket: usize, m: u32) -> String {
    format!("LOCSTOREFULL(store, {}, {}, STOREDIM, STOREDIM, {})", bra, ket, m)
}

/// Store-buffer access of component (`bra`, `ket`) in the m=0 plane.
pub fn store_top(bra: usize, ket: usize) -> String {
    format!("LOCSTORE(store, {}, {}, STOREDIM, STOREDIM)", bra, ket)
}

/// Lower-case `[d|p]` tag used in construction comments.
pub fn pair_tag(pair: ShellPair) -> String {
    pair.to_string().to_lowercase()
}

/// `Px, Dxy` comment naming a component by its labels.
pub fn component_comment(pair: ShellPair, bra: usize, ket: usize) -> String {
    format!(
        "{}, {}",
        table::label(pair.bra, bra),
        table::label(pair.ket, ket)
    )
}

/// Constructor parameters of a generated class.
///
/// Every class takes exactly the geometric factors its own recurrence, or any of its
/// dependencies, can touch. Dependencies never need a factor their consumer lacks, so a
/// consumer can always forward its own arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    bra_displacement: bool,
    ket_displacement: bool,
    inverse_two_zeta: bool,
}

impl Signature {
    pub fn for_pair(pair: ShellPair) -> Self {
        Self {
            bra_displacement: pair.bra.degree() > 0,
            ket_displacement: pair.ket.degree() > 0,
            inverse_two_zeta: pair.total_degree() >= 2,
        }
    }

    fn names(&self) -> Vec<String> {
        let mut centers = Vec::with_capacity(3);
        if self.bra_displacement {
            centers.push(Center::A);
        }
        if self.ket_displacement {
            centers.push(Center::B);
        }
        centers.push(Center::C);

        let mut names: Vec<String> = centers
            .into_iter()
            .flat_map(|center| Axis::ALL.into_iter().map(move |axis| center.displacement(axis)))
            .collect();
        if self.inverse_two_zeta {
            names.push("TwoZetaInv".to_string());
        }
        names
    }

    /// Parameter list, e.g. `QUICKDouble PAx, ..., QUICKDouble* store, QUICKDouble* YVerticalTemp`.
    pub fn parameters(&self, scalar: &str) -> String {
        let mut params: Vec<String> = self
            .names()
            .into_iter()
            .map(|name| format!("{} {}", scalar, name))
            .collect();
        params.push(format!("{}* store", scalar));
        params.push(format!("{}* YVerticalTemp", scalar));
        params.join(", ")
    }

    /// Argument list forwarding the same names, e.g. `PAx, ..., store, YVerticalTemp`.
    pub fn arguments(&self) -> String {
        let mut args = self.names();
        args.push("store".to_string());
        args.push("YVerticalTemp".to_string());
        args.join(", ")
    }
}
