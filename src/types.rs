//! Core value types shared by every stage of the generator.
//!
//! Shells, shell pairs, Cartesian components and the small enums naming axes, sides and
//! Gaussian centres. None of these types own generated text; they are plain `Copy` data
//! that the recurrence engine, the storage selector and the emitters pass around freely.

use crate::error::GenError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A Cartesian axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in scan order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of the axis inside an `[x, y, z]` triple.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Lower-case letter used in emitted identifiers (`PAx`, `PCz`, ...).
    pub fn letter(self) -> char {
        match self {
            Axis::X => 'x',
            Axis::Y => 'y',
            Axis::Z => 'z',
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Which basis function of the pair a recurrence step acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Bra,
    Ket,
}

impl Side {
    /// The opposite side of the pair.
    pub fn other(self) -> Side {
        match self {
            Side::Bra => Side::Ket,
            Side::Ket => Side::Bra,
        }
    }

    /// The Gaussian centre whose angular momentum this side carries.
    pub fn center(self) -> Center {
        match self {
            Side::Bra => Center::A,
            Side::Ket => Center::B,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bra => f.write_str("bra"),
            Side::Ket => f.write_str("ket"),
        }
    }
}

/// One of the three centres entering a one-electron integral.
///
/// `A` and `B` carry the bra and ket basis functions, `C` is the operator centre of the
/// potential. Displacement factors are always measured from the Gaussian product centre `P`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Center {
    A,
    B,
    C,
}

impl Center {
    /// Name of the displacement factor `P - center` along `axis`, e.g. `PBy`.
    pub fn displacement(self, axis: Axis) -> String {
        format!("{}{}", self, axis)
    }
}

impl fmt::Display for Center {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Center::A => f.write_str("PA"),
            Center::B => f.write_str("PB"),
            Center::C => f.write_str("PC"),
        }
    }
}

/// A shell of Cartesian Gaussians sharing a total angular-momentum degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shell {
    S,
    P,
    D,
    F,
    G,
}

impl Shell {
    /// All supported shells, ordered by degree.
    pub const ALL: [Shell; 5] = [Shell::S, Shell::P, Shell::D, Shell::F, Shell::G];

    /// Largest supported degree.
    pub const MAX_DEGREE: u8 = 4;

    /// Looks up the shell of the given total degree.
    ///
    /// # Errors
    ///
    /// Returns `GenError::InvalidDegree` for degrees above G.
    pub fn from_degree(degree: u8) -> Result<Self, GenError> {
        Shell::ALL
            .get(degree as usize)
            .copied()
            .ok_or(GenError::InvalidDegree(degree))
    }

    /// Looks up a shell from its upper- or lower-case letter.
    pub fn from_label(label: char) -> Option<Self> {
        match label.to_ascii_uppercase() {
            'S' => Some(Shell::S),
            'P' => Some(Shell::P),
            'D' => Some(Shell::D),
            'F' => Some(Shell::F),
            'G' => Some(Shell::G),
            _ => None,
        }
    }

    #[inline]
    pub fn degree(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> char {
        match self {
            Shell::S => 'S',
            Shell::P => 'P',
            Shell::D => 'D',
            Shell::F => 'F',
            Shell::G => 'G',
        }
    }

    /// Number of Cartesian components, `(d + 1)(d + 2) / 2`.
    #[inline]
    pub fn component_count(self) -> usize {
        let d = self.degree() as usize;
        (d + 1) * (d + 2) / 2
    }

    /// Global index of this shell's first component (s=0, p=1-3, d=4-9, f=10-19, g=20-34).
    #[inline]
    pub fn offset(self) -> usize {
        let d = self.degree() as usize;
        d * (d + 1) * (d + 2) / 6
    }

    /// The shell one degree higher, if supported.
    pub fn raised(self) -> Option<Self> {
        Shell::from_degree(self.degree() + 1).ok()
    }

    /// The shell one degree lower, if any.
    pub fn lowered(self) -> Option<Self> {
        self.degree()
            .checked_sub(1)
            .and_then(|d| Shell::from_degree(d).ok())
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A Cartesian Gaussian component `x^ex y^ey z^ez`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CartesianComponent {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl CartesianComponent {
    pub const fn new(x: u8, y: u8, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Total angular-momentum degree `ex + ey + ez`.
    #[inline]
    pub fn degree(self) -> u8 {
        self.x + self.y + self.z
    }

    #[inline]
    pub fn exponent(self, axis: Axis) -> u8 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// First axis, in x-y-z order, carrying a nonzero exponent.
    pub fn first_nonzero_axis(self) -> Option<Axis> {
        Axis::ALL.into_iter().find(|&axis| self.exponent(axis) > 0)
    }
}

impl fmt::Display for CartesianComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

/// An ordered (bra, ket) pair of shells naming one generation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShellPair {
    pub bra: Shell,
    pub ket: Shell,
}

impl ShellPair {
    pub const fn new(bra: Shell, ket: Shell) -> Self {
        Self { bra, ket }
    }

    /// Builds a pair from raw degrees.
    ///
    /// # Errors
    ///
    /// Returns `GenError::InvalidDegree` if either degree is above G.
    pub fn from_degrees(bra: u8, ket: u8) -> Result<Self, GenError> {
        Ok(Self::new(Shell::from_degree(bra)?, Shell::from_degree(ket)?))
    }

    /// Parses a two-letter label such as `"DP"` (case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        let mut chars = label.chars();
        let bra = Shell::from_label(chars.next()?)?;
        let ket = Shell::from_label(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Self::new(bra, ket))
    }

    /// Every pair from (S,S) to (G,G), bra-major.
    pub fn all() -> impl Iterator<Item = ShellPair> {
        Shell::ALL
            .into_iter()
            .flat_map(|bra| Shell::ALL.into_iter().map(move |ket| ShellPair::new(bra, ket)))
    }

    #[inline]
    pub fn total_degree(self) -> u8 {
        self.bra.degree() + self.ket.degree()
    }

    /// `true` for the (S,S) base case supplied by the external auxiliary primitive.
    #[inline]
    pub fn is_base(self) -> bool {
        self.total_degree() == 0
    }

    /// The shell on the given side.
    pub fn shell(self, side: Side) -> Shell {
        match side {
            Side::Bra => self.bra,
            Side::Ket => self.ket,
        }
    }

    /// Number of integral components `n_bra * n_ket`.
    pub fn component_count(self) -> usize {
        self.bra.component_count() * self.ket.component_count()
    }

    /// Two-letter label, e.g. `"DP"`.
    pub fn label(self) -> String {
        format!("{}{}", self.bra, self.ket)
    }
}

impl fmt::Display for ShellPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}|{}]", self.bra, self.ket)
    }
}
