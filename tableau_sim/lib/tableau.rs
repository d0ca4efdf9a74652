//! The improved tableau engine and the backend interface it implements.
//!
//! The generator rewrites for the three Clifford primitives act on single
//! columns of the store and are *O*(*n*); measurement is *O*(*n*²) in both
//! the random and the deterministic branch. Everything here works in the
//! engine's 1-based indexing.

use std::fmt;
use rand::{ rngs::StdRng, Rng, SeedableRng };
use crate::{
    error::EngineError,
    rowsum::rowsum,
    store::TableauStore,
};

/// Interface of a stabilizer-tableau backend.
///
/// `hadamard`, `phase`, `cnot`, and `measure` are the primitives a backend
/// must supply. Every auxiliary gate is a fixed rewrite into those
/// primitives, provided here as default methods so that all backends share
/// the exact sign bookkeeping. Qubit indices are 1-based.
pub trait StabilizerTableau {
    /// Number of qubits in the register.
    fn num_qubits(&self) -> usize;

    /// Apply a Hadamard gate to qubit `q`.
    fn hadamard(&mut self, q: usize) -> Result<(), EngineError>;

    /// Apply the π/2 phase gate S to qubit `q`.
    fn phase(&mut self, q: usize) -> Result<(), EngineError>;

    /// Apply a CNOT with control `c` and target `t`, `c` ≠ `t`.
    fn cnot(&mut self, c: usize, t: usize) -> Result<(), EngineError>;

    /// Measure qubit `q` in the Z basis.
    fn measure(&mut self, q: usize) -> Result<Outcome, EngineError>;

    /// Identity gate: validates the index, touches nothing.
    fn identity(&mut self, q: usize) -> Result<(), EngineError> {
        check_qubit(self.num_qubits(), q)
    }

    /// Pauli X as H·S·S·H.
    fn pauli_x(&mut self, q: usize) -> Result<(), EngineError> {
        self.hadamard(q)?;
        self.pauli_z(q)?;
        self.hadamard(q)
    }

    /// Pauli Z as S·S.
    fn pauli_z(&mut self, q: usize) -> Result<(), EngineError> {
        self.phase(q)?;
        self.phase(q)
    }

    /// Pauli Y.
    ///
    /// This sequence conjugates X → −X and Z → −Z exactly. Shorter variants
    /// that agree only up to a phase scramble the sign bits of the
    /// destabilizer rows.
    fn pauli_y(&mut self, q: usize) -> Result<(), EngineError> {
        self.pauli_z(q)?;
        self.pauli_x(q)?;
        self.phase(q)?;
        self.phase(q)?;
        self.phase(q)?;
        self.pauli_x(q)?;
        self.phase(q)?;
        self.phase(q)?;
        self.phase(q)?;
        self.pauli_x(q)
    }

    /// Swap qubits `a` and `b` via three CNOTs; `swap(a, a)` is a no-op.
    fn swap(&mut self, a: usize, b: usize) -> Result<(), EngineError> {
        if a == b {
            return check_qubit(self.num_qubits(), a);
        }
        self.cnot(a, b)?;
        self.cnot(b, a)?;
        self.cnot(a, b)
    }
}

fn check_qubit(n: usize, q: usize) -> Result<(), EngineError> {
    if (1..=n).contains(&q) {
        Ok(())
    } else {
        Err(EngineError::InvalidArgument(format!(
            "qubit index {q} outside 1..={n}"
        )))
    }
}

/// The result of a single-qubit Z-basis measurement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The state forced ∣0⟩.
    Det0,
    /// The state forced ∣1⟩.
    Det1,
    /// A fair draw came up ∣0⟩.
    Rand0,
    /// A fair draw came up ∣1⟩.
    Rand1,
}

impl Outcome {
    /// The measured bit.
    pub fn bit(self) -> u8 {
        u8::from(matches!(self, Self::Det1 | Self::Rand1))
    }

    /// `true` if the outcome was forced by the state rather than drawn.
    pub fn is_deterministic(self) -> bool {
        matches!(self, Self::Det0 | Self::Det1)
    }
}

/// A stabilizer state in the improved tableau representation: *n*
/// destabilizer rows, *n* stabilizer rows, and one scratch row over a packed
/// bit array, plus the engine-owned randomness that feeds measurement.
#[derive(Clone, Debug)]
pub struct ImprovedTableau {
    store: TableauStore,
    rng: StdRng,
}

impl ImprovedTableau {
    /// New engine for `n` qubits in ∣0...0⟩, drawing measurement bits from
    /// operating-system entropy.
    pub fn new(n: usize) -> Result<Self, EngineError> {
        Ok(Self { store: TableauStore::new(n)?, rng: StdRng::from_entropy() })
    }

    /// New engine with a fixed seed, for reproducible measurement draws.
    pub fn with_seed(n: usize, seed: u64) -> Result<Self, EngineError> {
        Ok(Self {
            store: TableauStore::new(n)?,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Read-only view of the underlying store.
    pub fn store(&self) -> &TableauStore { &self.store }

    /// Snapshot the packed storage as `(n, bytes)`.
    pub fn dump(&self) -> (usize, Vec<u8>) { self.store.dump() }

    /// Rebuild an engine from a [`dump`][Self::dump] snapshot. The restored
    /// engine draws from fresh entropy; the snapshot holds no RNG state.
    pub fn restore(n: usize, bits: Vec<u8>) -> Result<Self, EngineError> {
        Ok(Self {
            store: TableauStore::restore(n, bits)?,
            rng: StdRng::from_entropy(),
        })
    }

    /// Render the destabilizer and stabilizer rows as signed Pauli strings.
    pub fn generators(&self) -> GeneratorSet {
        let n = self.store.num_qubits();
        let row = |i: usize| {
            let mut s = String::with_capacity(n + 1);
            s.push(if self.store.r(i) { '-' } else { '+' });
            for j in 1..=n {
                s.push(match (self.store.x(i, j), self.store.z(i, j)) {
                    (false, false) => 'I',
                    (true, false) => 'X',
                    (false, true) => 'Z',
                    (true, true) => 'Y',
                });
            }
            s
        };
        GeneratorSet {
            destab: (1..=n).map(row).collect(),
            stab: (n + 1..=2 * n).map(row).collect(),
        }
    }

    fn hadamard_unchecked(&mut self, a: usize) {
        let t = &mut self.store;
        for i in 1..=2 * t.num_qubits() {
            let x = t.x(i, a);
            let z = t.z(i, a);
            let r = t.r(i);
            t.put_r(i, r ^ (x & z));
            t.put_x(i, a, z);
            t.put_z(i, a, x);
        }
    }

    fn phase_unchecked(&mut self, a: usize) {
        let t = &mut self.store;
        for i in 1..=2 * t.num_qubits() {
            let x = t.x(i, a);
            let z = t.z(i, a);
            let r = t.r(i);
            t.put_r(i, r ^ (x & z));
            t.put_z(i, a, z ^ x);
        }
    }

    fn cnot_unchecked(&mut self, a: usize, b: usize) {
        let t = &mut self.store;
        for i in 1..=2 * t.num_qubits() {
            let xa = t.x(i, a);
            let za = t.z(i, a);
            let xb = t.x(i, b);
            let zb = t.z(i, b);
            let r = t.r(i);
            t.put_r(i, r ^ (xa & zb & !(xb ^ za)));
            t.put_x(i, b, xb ^ xa);
            t.put_z(i, a, za ^ zb);
        }
    }

    fn measure_unchecked(&mut self, a: usize) -> Result<Outcome, EngineError> {
        let n = self.store.num_qubits();
        if let Some(p) = (n + 1..=2 * n).find(|&p| self.store.x(p, a)) {
            // some stabilizer anticommutes with Z_a, so the outcome is a
            // fair draw and the generator set is rewritten around row p
            for i in 1..=2 * n {
                if i != p && self.store.x(i, a) {
                    rowsum(&mut self.store, i, p)?;
                }
            }
            self.store.row_copy(p, p - n);
            self.store.row_clear(p);
            let bit: bool = self.rng.gen();
            self.store.put_r(p, bit);
            self.store.put_z(p, a, true);
            Ok(if bit { Outcome::Rand1 } else { Outcome::Rand0 })
        } else {
            // every stabilizer commutes with Z_a; accumulate the stabilizer
            // partner of each destabilizer hit in the scratch row and read
            // off its sign
            let scratch = self.store.scratch();
            self.store.row_clear(scratch);
            for i in 1..=n {
                if self.store.x(i, a) {
                    rowsum(&mut self.store, scratch, i + n)?;
                }
            }
            Ok(if self.store.r(scratch) { Outcome::Det1 } else { Outcome::Det0 })
        }
    }
}

impl StabilizerTableau for ImprovedTableau {
    fn num_qubits(&self) -> usize { self.store.num_qubits() }

    fn hadamard(&mut self, q: usize) -> Result<(), EngineError> {
        check_qubit(self.num_qubits(), q)?;
        self.hadamard_unchecked(q);
        Ok(())
    }

    fn phase(&mut self, q: usize) -> Result<(), EngineError> {
        check_qubit(self.num_qubits(), q)?;
        self.phase_unchecked(q);
        Ok(())
    }

    fn cnot(&mut self, c: usize, t: usize) -> Result<(), EngineError> {
        let n = self.num_qubits();
        check_qubit(n, c)?;
        check_qubit(n, t)?;
        if c == t {
            return Err(EngineError::InvalidArgument(format!(
                "control and target are both qubit {c}"
            )));
        }
        self.cnot_unchecked(c, t);
        Ok(())
    }

    fn measure(&mut self, q: usize) -> Result<Outcome, EngineError> {
        check_qubit(self.num_qubits(), q)?;
        self.measure_unchecked(q)
    }
}

/// The destabilizer and stabilizer generators of a state as signed Pauli
/// strings, e.g. `+XX`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorSet {
    pub destab: Vec<String>,
    pub stab: Vec<String>,
}

impl fmt::Display for GeneratorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Destab")?;
        for row in &self.destab {
            writeln!(f, "{row}")?;
        }
        writeln!(f, "Stab")?;
        let last = self.stab.len().saturating_sub(1);
        for (k, row) in self.stab.iter().enumerate() {
            row.fmt(f)?;
            if k < last { writeln!(f)?; }
        }
        Ok(())
    }
}
