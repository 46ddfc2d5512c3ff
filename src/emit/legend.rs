use crate::error::GenError;
use crate::table;
use std::fmt::Write;

/// Writes the `[bra|ket]` label of every m=0 store address for shells up to `max_degree`.
///
/// One line per global ket index, listing bra indices in address order.
pub fn write_store_legend(max_degree: u8, out: &mut String) -> Result<(), GenError> {
    let dim = crate::storage::required_store_dim(max_degree);
    writeln!(out, "// store layout for m=0, {} x {} components", dim, dim)?;
    for ket in 0..dim {
        let ket_label = table::global_label(ket).unwrap_or("?");
        write!(out, "{:>3}:", ket)?;
        for bra in 0..dim {
            let bra_label = table::global_label(bra).unwrap_or("?");
            write!(out, " [{}|{}]", bra_label, ket_label)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
