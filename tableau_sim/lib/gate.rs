//! Gate descriptions for register circuits.
//!
//! A [`Gate`] names one unitary (or identity) statement with the 0-based
//! qubit indices used by circuit text; the executor in
//! [`circuit`][crate::circuit] shifts to the engine's 1-based indexing.
//! `Display` renders the statement in circuit syntax, which is also how the
//! random generator emits its output.

use std::fmt;

/// A single gate statement over a qubit register.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Identity
    Id(usize),
    /// Hadamard
    H(usize),
    /// π/2 phase
    S(usize),
    /// Pauli X
    X(usize),
    /// Pauli Y
    Y(usize),
    /// Pauli Z
    Z(usize),
    /// Controlled X; the first index is the control.
    CX(usize, usize),
    /// Swap
    Swap(usize, usize),
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Id(k) => write!(f, "id q[{k}];"),
            Self::H(k) => write!(f, "h q[{k}];"),
            Self::S(k) => write!(f, "s q[{k}];"),
            Self::X(k) => write!(f, "x q[{k}];"),
            Self::Y(k) => write!(f, "y q[{k}];"),
            Self::Z(k) => write!(f, "z q[{k}];"),
            Self::CX(c, t) => write!(f, "cx q[{c}],q[{t}];"),
            Self::Swap(a, b) => write!(f, "swap q[{a}],q[{b}];"),
        }
    }
}
