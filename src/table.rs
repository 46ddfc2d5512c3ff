//! Canonical Cartesian component ordering for S through G shells.
//!
//! The generated kernels address the store buffer by index arithmetic, so the order below is
//! load-bearing and must never be "tidied up": component #i of a shell denotes the same
//! exponent triple in every shell pair. Indices come in two flavours:
//!
//! * the *canonical* index, local to a shell (`0..component_count`), and
//! * the *global* index, the canonical index shifted by the shell offset (s=0, p=1-3,
//!   d=4-9, f=10-19, g=20-34). Store addresses and emitted field names use global indices.

use crate::error::GenError;
use crate::types::{Axis, CartesianComponent, Shell};

const fn c(x: u8, y: u8, z: u8) -> CartesianComponent {
    CartesianComponent::new(x, y, z)
}

/// All 35 components, shell after shell, in the reference enumeration order.
const REFERENCE_ORDER: [CartesianComponent; 35] = [
    // s
    c(0, 0, 0),
    // p
    c(1, 0, 0),
    c(0, 1, 0),
    c(0, 0, 1),
    // d
    c(1, 1, 0),
    c(0, 1, 1),
    c(1, 0, 1),
    c(2, 0, 0),
    c(0, 2, 0),
    c(0, 0, 2),
    // f
    c(1, 1, 1),
    c(2, 1, 0),
    c(1, 2, 0),
    c(2, 0, 1),
    c(1, 0, 2),
    c(0, 2, 1),
    c(0, 1, 2),
    c(3, 0, 0),
    c(0, 3, 0),
    c(0, 0, 3),
    // g
    c(2, 2, 0),
    c(2, 0, 2),
    c(0, 2, 2),
    c(2, 1, 1),
    c(1, 2, 1),
    c(1, 1, 2),
    c(3, 0, 1),
    c(1, 0, 3),
    c(3, 1, 0),
    c(1, 3, 0),
    c(0, 3, 1),
    c(0, 1, 3),
    c(4, 0, 0),
    c(0, 4, 0),
    c(0, 0, 4),
];

static COMPONENTS: [CartesianComponent; 35] = REFERENCE_ORDER;

static LABELS: [&str; 35] = [
    "S", "Px", "Py", "Pz", "Dxy", "Dyz", "Dxz", "Dxx", "Dyy", "Dzz", "Fxyz", "Fxxy", "Fxyy",
    "Fxxz", "Fxzz", "Fyyz", "Fyzz", "Fxxx", "Fyyy", "Fzzz", "Gxxyy", "Gxxzz", "Gyyzz", "Gxxyz",
    "Gxyyz", "Gxyzz", "Gxxxz", "Gxzzz", "Gxxxy", "Gxyyy", "Gyyyz", "Gyzzz", "Gxxxx", "Gyyyy",
    "Gzzzz",
];

const NO_COMPONENT: u8 = u8::MAX;
const EXPONENT_SPAN: usize = Shell::MAX_DEGREE as usize + 1;

/// Reverse lookup `[ex][ey][ez] -> global index`, built at compile time from the reference order.
static INVERSE: [[[u8; EXPONENT_SPAN]; EXPONENT_SPAN]; EXPONENT_SPAN] = build_inverse();

const fn build_inverse() -> [[[u8; EXPONENT_SPAN]; EXPONENT_SPAN]; EXPONENT_SPAN] {
    let mut table = [[[NO_COMPONENT; EXPONENT_SPAN]; EXPONENT_SPAN]; EXPONENT_SPAN];
    let mut i = 0;
    while i < REFERENCE_ORDER.len() {
        let comp = REFERENCE_ORDER[i];
        table[comp.x as usize][comp.y as usize][comp.z as usize] = i as u8;
        i += 1;
    }
    table
}

/// Canonical (shell-local) index of `component` inside the shell of degree `degree`.
///
/// # Errors
///
/// Returns `GenError::InvalidDegree` for degrees above G and
/// `GenError::ComponentOutsideShell` if the component's degree differs from `degree`.
pub fn canonical_index(degree: u8, component: CartesianComponent) -> Result<usize, GenError> {
    let shell = Shell::from_degree(degree)?;
    if component.degree() != degree {
        return Err(GenError::ComponentOutsideShell { component, degree });
    }
    Ok(global_index_of(component) - shell.offset())
}

/// Exponent triple of the component with canonical index `index` in the shell of degree `degree`.
///
/// # Errors
///
/// Returns `GenError::InvalidDegree` for degrees above G and
/// `GenError::InvalidComponentIndex` if `index` is outside the shell.
pub fn triple_of(degree: u8, index: usize) -> Result<CartesianComponent, GenError> {
    let shell = Shell::from_degree(degree)?;
    components(shell)
        .get(index)
        .copied()
        .ok_or(GenError::InvalidComponentIndex { degree, index })
}

/// Decrements the exponent of `component` along `axis`.
///
/// # Errors
///
/// Returns `GenError::InvalidAxis` if that exponent is already zero.
pub fn lower_axis(component: CartesianComponent, axis: Axis) -> Result<CartesianComponent, GenError> {
    let mut lowered = component;
    let slot = match axis {
        Axis::X => &mut lowered.x,
        Axis::Y => &mut lowered.y,
        Axis::Z => &mut lowered.z,
    };
    *slot = slot
        .checked_sub(1)
        .ok_or(GenError::InvalidAxis { component, axis })?;
    Ok(lowered)
}

/// The components of `shell` in canonical order.
#[inline]
pub fn components(shell: Shell) -> &'static [CartesianComponent] {
    let start = shell.offset();
    &COMPONENTS[start..start + shell.component_count()]
}

/// Global index of a canonical index within `shell`.
#[inline]
pub fn global_index(shell: Shell, index: usize) -> usize {
    shell.offset() + index
}

/// Text label of the component with canonical index `index` in `shell` (e.g. `"Dxy"`).
pub fn label(shell: Shell, index: usize) -> &'static str {
    LABELS[global_index(shell, index)]
}

/// Text label by global index.
pub fn global_label(global: usize) -> Option<&'static str> {
    LABELS.get(global).copied()
}

/// Total number of components across S..G.
pub fn total_components() -> usize {
    COMPONENTS.len()
}

fn global_index_of(component: CartesianComponent) -> usize {
    // Callers validate the degree first, so every exponent is within the table span.
    INVERSE[component.x as usize][component.y as usize][component.z as usize] as usize
}
