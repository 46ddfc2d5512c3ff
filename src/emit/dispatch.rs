//! The top-level integral assembly switch.
//!
//! One branch per requested shell pair instantiates the m=0 class and copies its components
//! into the caller's result buffer at their global (bra, ket) addresses. Store-resident
//! classes already wrote those addresses in their constructor, so their branch only
//! constructs the object.

use super::naming::{self, Signature};
use crate::error::GenError;
use crate::storage::StorageLayout;
use crate::table;
use crate::types::ShellPair;
use std::collections::BTreeSet;
use std::fmt::Write;

pub(crate) const BRANCH_INDENT: &str = "    ";

/// Emits the integral assembly dispatcher over a fixed set of requested shell pairs.
pub struct AssemblyDispatcher<'a> {
    layout: &'a StorageLayout,
    requested: &'a BTreeSet<ShellPair>,
    debug: bool,
}

impl<'a> AssemblyDispatcher<'a> {
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

    /// Emits the branch of `pair` and returns the number of debug prints written.
    ///
    /// # Errors
    ///
    /// Returns `GenError::UnsupportedShellPair` if `pair` was not requested.
    pub fn emit_branch(&self, pair: ShellPair, out: &mut String) -> Result<usize, GenError> {
        if !self.requested.contains(&pair) {
            return Err(unsupported(pair));
        }
        writeln!(out)?;
        writeln!(out, "  /* {} integral, m=0 */", pair.label())?;
        writeln!(
            out,
            "  if(I == {} && J == {}){{",
            pair.bra.degree(),
            pair.ket.degree()
        )?;
        write_copy(self.layout, pair, out)?;
        let prints = if self.debug {
            write_debug_prints(pair, out)?
        } else {
            0
        };
        writeln!(out, "  }}")?;
        Ok(prints)
    }
}

pub(crate) fn unsupported(pair: ShellPair) -> GenError {
    GenError::UnsupportedShellPair {
        bra: pair.bra.degree(),
        ket: pair.ket.degree(),
    }
}

/// Constructs the m=0 class of `pair` and copies named values into the m=0 store plane.
pub(crate) fn write_copy(
    layout: &StorageLayout,
    pair: ShellPair,
    out: &mut String,
) -> Result<(), GenError> {
    if pair.is_base() {
        writeln!(
            out,
            "{}{} = {};",
            BRANCH_INDENT,
            naming::store_top(0, 0),
            naming::base_read(0)
        )?;
        return Ok(());
    }
    if !layout.contains(pair) {
        return Err(unsupported(pair));
    }

    let object = naming::branch_object_name(pair);
    writeln!(
        out,
        "{}{} {}({});",
        BRANCH_INDENT,
        naming::class_name(pair, 0),
        object,
        Signature::for_pair(pair).arguments()
    )?;
    if layout.keeps_named_values(pair) {
        for (bra, ket) in global_indices(pair) {
            writeln!(
                out,
                "{}{} = {}.{};",
                BRANCH_INDENT,
                naming::store_top(bra, ket),
                object,
                naming::field_name(bra, ket)
            )?;
        }
    }
    Ok(())
}

/// `#ifdef`-guarded prints of every m=0 component of `pair`, tagged with the caller's loop indices.
pub(crate) fn write_debug_prints(pair: ShellPair, out: &mut String) -> Result<usize, GenError> {
    writeln!(out, "#ifdef {}", naming::DEBUG_MACRO)?;
    let mut prints = 0;
    for (bra, ket) in global_indices(pair) {
        writeln!(
            out,
            "{}printf(\"II %d JJ %d {} store[{},{}] = %f \\n\", II, JJ, {});",
            BRANCH_INDENT,
            pair.label(),
            bra,
            ket,
            naming::store_top(bra, ket)
        )?;
        prints += 1;
    }
    writeln!(out, "#endif")?;
    Ok(prints)
}

/// Global (bra, ket) indices of every component of `pair`, bra-major.
fn global_indices(pair: ShellPair) -> impl Iterator<Item = (usize, usize)> {
    (0..pair.bra.component_count()).flat_map(move |bra| {
        (0..pair.ket.component_count()).map(move |ket| {
            (
                table::global_index(pair.bra, bra),
                table::global_index(pair.ket, ket),
            )
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageStrategy;
    use crate::types::Shell;

    fn setup() -> (StorageLayout, BTreeSet<ShellPair>) {
        let mut layout = StorageLayout::new();
        layout.insert(ShellPair::new(Shell::P, Shell::S), StorageStrategy::FullRegister);
        layout.insert(ShellPair::new(Shell::D, Shell::D), StorageStrategy::GlobalStore);
        let requested = [
            ShellPair::new(Shell::S, Shell::S),
            ShellPair::new(Shell::P, Shell::S),
            ShellPair::new(Shell::D, Shell::D),
        ]
        .into_iter()
        .collect();
        (layout, requested)
    }

    #[test]
    fn full_register_branch_copies_every_component() {
        let (layout, requested) = setup();
        let mut out = String::new();
        AssemblyDispatcher::new(&layout, &requested, false)
            .emit_branch(ShellPair::new(Shell::P, Shell::S), &mut out)
            .unwrap();

        assert!(out.contains("  if(I == 1 && J == 0){"));
        assert!(out.contains("    PSint_0 ps(PAx, PAy, PAz, PCx, PCy, PCz, store, YVerticalTemp);"));
        assert!(out.contains("    LOCSTORE(store, 1, 0, STOREDIM, STOREDIM) = ps.x_1_0;"));
        assert!(out.contains("    LOCSTORE(store, 3, 0, STOREDIM, STOREDIM) = ps.x_3_0;"));
        assert!(!out.contains("printf"));
    }

    #[test]
    fn store_resident_branch_only_constructs() {
        let (layout, requested) = setup();
        let mut out = String::new();
        AssemblyDispatcher::new(&layout, &requested, false)
            .emit_branch(ShellPair::new(Shell::D, Shell::D), &mut out)
            .unwrap();
        assert!(out.contains("    DDint_0 dd("));
        assert!(!out.contains("LOCSTORE"));
    }

    #[test]
    fn base_branch_copies_the_primitive() {
        let (layout, requested) = setup();
        let mut out = String::new();
        AssemblyDispatcher::new(&layout, &requested, false)
            .emit_branch(ShellPair::new(Shell::S, Shell::S), &mut out)
            .unwrap();
        assert!(out.contains("  if(I == 0 && J == 0){"));
        assert!(out.contains("    LOCSTORE(store, 0, 0, STOREDIM, STOREDIM) = VY(0, 0, 0);"));
    }

    #[test]
    fn debug_prints_are_guarded_and_counted() {
        let (layout, requested) = setup();
        let mut out = String::new();
        let prints = AssemblyDispatcher::new(&layout, &requested, true)
            .emit_branch(ShellPair::new(Shell::P, Shell::S), &mut out)
            .unwrap();
        assert_eq!(prints, 3);
        assert!(out.contains("#ifdef DEBUG_OEI\n"));
        assert!(out.contains(
            "    printf(\"II %d JJ %d PS store[2,0] = %f \\n\", II, JJ, LOCSTORE(store, 2, 0, STOREDIM, STOREDIM));"
        ));
    }

    #[test]
    fn unrequested_pair_is_unsupported() {
        let (layout, requested) = setup();
        let result = AssemblyDispatcher::new(&layout, &requested, false)
            .emit_branch(ShellPair::new(Shell::P, Shell::P), &mut String::new());
        assert!(matches!(
            result,
            Err(GenError::UnsupportedShellPair { bra: 1, ket: 1 })
        ));
    }

    #[test]
    fn emit_writes_one_branch_per_request() {
        let (layout, requested) = setup();
        let mut out = String::new();
        AssemblyDispatcher::new(&layout, &requested, false)
            .emit(&mut out)
            .unwrap();
        assert_eq!(out.matches("  if(I == ").count(), 3);
    }
}
