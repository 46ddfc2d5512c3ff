//! Linear addressing of the shared store buffer.
//!
//! The emitted `LOCSTORE`/`LOCSTOREFULL` macros expand to exactly this arithmetic, so the Rust
//! side and the generated kernels agree on where every component lives.

/// Address of component (`bra`, `ket`) at auxiliary order `m`, both indices global.
///
/// `address = m * store_dim^2 + ket * store_dim + bra`
#[inline]
pub fn store_address(bra: usize, ket: usize, m: u32, store_dim: usize) -> usize {
    (m as usize * store_dim + ket) * store_dim + bra
}

/// Smallest store dimension able to hold every component up to shell degree `max_degree`.
pub fn required_store_dim(max_degree: u8) -> usize {
    let d = max_degree as usize + 1;
    d * (d + 1) * (d + 2) / 6
}
