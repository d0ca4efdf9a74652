//! Circuit text handling.
//!
//! The accepted format is the line-oriented OPENQASM-3 subset: the literal
//! header `OPENQASM 3;`, a `qreg q[n];` declaration, then one statement per
//! non-empty line drawn from `id`/`h`/`s`/`x`/`y`/`z`/`cx`/`swap`/`measure`.
//! Qubit indices in text are 0-based; this module applies the +1 offset when
//! driving an engine, and nowhere else.
//!
//! Besides the parser and the executor, this module carries the random
//! circuit generator and a line validator for writing circuit files.

use std::fmt;
use once_cell::sync::Lazy;
use rand::{ distributions::{ Distribution, WeightedIndex }, rngs::StdRng, Rng, SeedableRng };
use regex::Regex;
use thiserror::Error;
use crate::{
    error::EngineError,
    gate::Gate,
    tableau::{ ImprovedTableau, StabilizerTableau },
};

static QREG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^qreg q\[(\d+)\];$").unwrap());
static ONE_QUBIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(id|h|s|x|y|z|measure) q\[(\d+)\];$").unwrap());
static TWO_QUBIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(cx|swap) q\[(\d+)\],q\[(\d+)\];$").unwrap());

/// Failure while reading or executing circuit text.
///
/// The engine is never touched once a parse error has been found.
#[derive(Debug, Error)]
pub enum CircuitError {
    /// A line is not a statement of the accepted format.
    #[error("parse error on line {number}: {line:?}")]
    Parse { number: usize, line: String },

    /// A line names a gate outside the supported set.
    #[error("unsupported gate on line {number}: {line:?}")]
    Unsupported { number: usize, line: String },

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The engine rejected an operation.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// One executable statement, with 0-based qubit indices as written.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// A unitary (or identity) gate.
    Gate(Gate),
    /// A single-qubit Z-basis measurement.
    Measure(usize),
}

impl Op {
    /// Drive one statement against `tab`, updating the measurement string.
    ///
    /// The engine validates before mutating, so the record is only touched
    /// after the operation succeeded.
    pub fn apply<T>(&self, tab: &mut T, record: &mut MeasRecord) -> Result<(), EngineError>
    where T: StabilizerTableau
    {
        match *self {
            Op::Gate(gate) => match gate {
                // a prior outcome stays visible across an identity
                Gate::Id(k) => tab.identity(k.saturating_add(1))?,
                Gate::H(k) => {
                    tab.hadamard(k.saturating_add(1))?;
                    record.invalidate(k);
                },
                Gate::S(k) => {
                    tab.phase(k.saturating_add(1))?;
                    record.invalidate(k);
                },
                Gate::X(k) => {
                    tab.pauli_x(k.saturating_add(1))?;
                    record.invalidate(k);
                },
                Gate::Y(k) => {
                    tab.pauli_y(k.saturating_add(1))?;
                    record.invalidate(k);
                },
                Gate::Z(k) => {
                    tab.pauli_z(k.saturating_add(1))?;
                    record.invalidate(k);
                },
                Gate::CX(c, t) => {
                    tab.cnot(c.saturating_add(1), t.saturating_add(1))?;
                    record.invalidate(c);
                    record.invalidate(t);
                },
                Gate::Swap(a, b) => {
                    tab.swap(a.saturating_add(1), b.saturating_add(1))?;
                    record.invalidate(a);
                    record.invalidate(b);
                },
            },
            Op::Measure(k) => {
                let outcome = tab.measure(k.saturating_add(1))?;
                record.record(k, outcome.bit());
            },
        }
        Ok(())
    }
}

/// Parse one statement line (already trimmed).
pub fn parse_stmt(line: &str) -> Option<Op> {
    if let Some(caps) = ONE_QUBIT.captures(line) {
        let k: usize = caps[2].parse().ok()?;
        let op = match &caps[1] {
            "id" => Op::Gate(Gate::Id(k)),
            "h" => Op::Gate(Gate::H(k)),
            "s" => Op::Gate(Gate::S(k)),
            "x" => Op::Gate(Gate::X(k)),
            "y" => Op::Gate(Gate::Y(k)),
            "z" => Op::Gate(Gate::Z(k)),
            "measure" => Op::Measure(k),
            _ => unreachable!(),
        };
        return Some(op);
    }
    if let Some(caps) = TWO_QUBIT.captures(line) {
        let a: usize = caps[2].parse().ok()?;
        let b: usize = caps[3].parse().ok()?;
        let op = match &caps[1] {
            "cx" => Op::Gate(Gate::CX(a, b)),
            "swap" => Op::Gate(Gate::Swap(a, b)),
            _ => unreachable!(),
        };
        return Some(op);
    }
    None
}

/// Parse a `qreg q[n];` declaration line (already trimmed).
pub fn parse_qreg(line: &str) -> Option<usize> {
    QREG.captures(line)?[1].parse().ok()
}

/// The measurement string: one character per qubit, `'x'` while a qubit has
/// no current outcome, `'0'`/`'1'` after a measurement. Any later gate on a
/// measured qubit returns its character to `'x'`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeasRecord(Vec<u8>);

impl MeasRecord {
    /// All-`'x'` record for `n` qubits.
    pub fn new(n: usize) -> Self { Self(vec![b'x'; n]) }

    /// Note the outcome `bit` for 0-based qubit `q`.
    pub fn record(&mut self, q: usize, bit: u8) {
        self.0[q] = b'0' + bit;
    }

    /// Drop the outcome of 0-based qubit `q`, if any.
    pub fn invalidate(&mut self, q: usize) {
        self.0[q] = b'x';
    }

    /// `true` while 0-based qubit `q` has no recorded outcome.
    pub fn is_pending(&self, q: usize) -> bool {
        self.0[q] == b'x'
    }
}

impl fmt::Display for MeasRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        for &b in &self.0 {
            f.write_char(char::from(b))?;
        }
        Ok(())
    }
}

/// A parsed circuit: register width and statement stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Circuit {
    n: usize,
    ops: Vec<Op>,
}

impl Circuit {
    /// Parse circuit text.
    ///
    /// Lines are trimmed of surrounding whitespace only; internal spacing is
    /// significant. Empty statement lines are skipped. Qubit-range checks
    /// are left to the engine at execution time.
    pub fn parse(src: &str) -> Result<Self, CircuitError> {
        let mut lines = src.lines().enumerate().map(|(k, l)| (k + 1, l.trim()));
        match lines.next() {
            Some((_, "OPENQASM 3;")) => { },
            Some((number, line)) => {
                return Err(CircuitError::Parse { number, line: line.into() });
            },
            None => {
                return Err(CircuitError::Parse { number: 1, line: String::new() });
            },
        }
        let n = match lines.next() {
            Some((number, line)) => parse_qreg(line)
                .ok_or_else(|| CircuitError::Parse { number, line: line.into() })?,
            None => {
                return Err(CircuitError::Parse { number: 2, line: String::new() });
            },
        };
        let mut ops: Vec<Op> = Vec::new();
        for (number, line) in lines {
            if line.is_empty() {
                continue;
            }
            let op = parse_stmt(line)
                .ok_or_else(|| CircuitError::Parse { number, line: line.into() })?;
            ops.push(op);
        }
        Ok(Self { n, ops })
    }

    /// Register width named by the `qreg` line.
    pub fn num_qubits(&self) -> usize { self.n }

    /// The statement stream.
    pub fn ops(&self) -> &[Op] { &self.ops }

    /// Execute against a backend already sized to `self.num_qubits()`,
    /// returning the final measurement string.
    pub fn run<T>(&self, tab: &mut T) -> Result<String, CircuitError>
    where T: StabilizerTableau
    {
        if tab.num_qubits() != self.n {
            return Err(EngineError::InvalidArgument(format!(
                "backend holds {} qubits but the circuit declares {}",
                tab.num_qubits(),
                self.n,
            ))
            .into());
        }
        let mut record = MeasRecord::new(self.n);
        for op in &self.ops {
            op.apply(tab, &mut record)?;
        }
        Ok(record.to_string())
    }
}

/// Parse and execute in one call on a fresh [`ImprovedTableau`], optionally
/// seeded for reproducible measurement draws.
pub fn execute_circuit(src: &str, seed: Option<u64>) -> Result<String, CircuitError> {
    let circuit = Circuit::parse(src)?;
    let mut tab = match seed {
        Some(s) => ImprovedTableau::with_seed(circuit.num_qubits(), s),
        None => ImprovedTableau::new(circuit.num_qubits()),
    }?;
    circuit.run(&mut tab)
}

/// Check that `src` is well-formed circuit text and return it normalized
/// (lines trimmed) for writing to a file.
///
/// Stricter than [`Circuit::parse`]: every line after the `qreg`
/// declaration must be a statement, blank lines included. A bad line that
/// starts with a known gate token is reported as
/// [`CircuitError::Unsupported`]; anything else as [`CircuitError::Parse`].
pub fn validate_circuit(src: &str) -> Result<String, CircuitError> {
    const TOKENS: [&str; 9] =
        ["id", "cx", "h", "s", "measure", "x", "y", "z", "swap"];
    let mut out = String::new();
    let mut seen = 0_usize;
    for (k, raw) in src.lines().enumerate() {
        let number = k + 1;
        let line = raw.trim();
        seen = number;
        let ok = match number {
            1 => line == "OPENQASM 3;",
            2 => parse_qreg(line).is_some(),
            _ => parse_stmt(line).is_some(),
        };
        if !ok {
            if number > 2 && TOKENS.iter().any(|t| line.starts_with(t)) {
                return Err(CircuitError::Unsupported { number, line: line.into() });
            }
            return Err(CircuitError::Parse { number, line: line.into() });
        }
        out.push_str(line);
        out.push('\n');
    }
    if seen < 2 {
        return Err(CircuitError::Parse { number: seen + 1, line: String::new() });
    }
    Ok(out)
}

/// Settings for [`random_circuit`].
#[derive(Copy, Clone, Debug)]
pub struct RandomCircuitConfig {
    /// Register width; 2-qubit gates are only drawn when it is at least 2.
    pub qubits: usize,
    /// Number of statements to draw.
    pub depth: usize,
    /// Seed for the gate-kind stream.
    pub gate_seed: u64,
    /// Seed for the qubit-index stream.
    pub qubit_seed: u64,
    /// Allow `measure` statements in the body.
    pub intermediate_measurements: bool,
    /// Append a measurement of every qubit.
    pub measure_all_at_end: bool,
}

#[derive(Copy, Clone)]
enum Kind { X, Y, Z, H, S, CNot, Swap, Measure }

/// Emit a random stabilizer circuit as circuit text.
///
/// Gate kinds and qubit indices come from two independently seeded streams,
/// so circuits with the same shape but different wiring are easy to produce.
/// With 2-qubit gates and intermediate measurements enabled, the unitary
/// kinds are drawn at weight 0.13 each and `measure` at 0.09; without
/// measurements the applicable unitary set is drawn uniformly.
pub fn random_circuit(config: &RandomCircuitConfig) -> String {
    let mut out = format!("OPENQASM 3;\nqreg q[{}];\n", config.qubits);
    if config.qubits == 0 {
        return out;
    }
    let two = config.qubits >= 2;
    let table: Vec<(Kind, f64)> = {
        let mut unitary = vec![Kind::X, Kind::Y, Kind::Z, Kind::H, Kind::S];
        if two {
            unitary.push(Kind::CNot);
            unitary.push(Kind::Swap);
        }
        let count = unitary.len() as f64;
        let (pu, pm) = match (two, config.intermediate_measurements) {
            (true, true) => (0.13, Some(0.09)),
            (false, true) => (0.19, Some(0.05)),
            (_, false) => (1.0 / count, None),
        };
        let mut table: Vec<(Kind, f64)> =
            unitary.into_iter().map(|k| (k, pu)).collect();
        if let Some(pm) = pm {
            table.push((Kind::Measure, pm));
        }
        table
    };
    let dist = WeightedIndex::new(table.iter().map(|(_, w)| *w))
        .expect("gate weights are positive");
    let mut gate_rng = StdRng::seed_from_u64(config.gate_seed);
    let mut qubit_rng = StdRng::seed_from_u64(config.qubit_seed);
    let other = |q: usize, rng: &mut StdRng| loop {
        let q2 = rng.gen_range(0..config.qubits);
        if q2 != q {
            break q2;
        }
    };
    for _ in 0..config.depth {
        let q1 = qubit_rng.gen_range(0..config.qubits);
        let line = match table[dist.sample(&mut gate_rng)].0 {
            Kind::X => Gate::X(q1).to_string(),
            Kind::Y => Gate::Y(q1).to_string(),
            Kind::Z => Gate::Z(q1).to_string(),
            Kind::H => Gate::H(q1).to_string(),
            Kind::S => Gate::S(q1).to_string(),
            Kind::CNot => Gate::CX(q1, other(q1, &mut qubit_rng)).to_string(),
            Kind::Swap => Gate::Swap(q1, other(q1, &mut qubit_rng)).to_string(),
            Kind::Measure => format!("measure q[{q1}];"),
        };
        out.push_str(&line);
        out.push('\n');
    }
    if config.measure_all_at_end {
        for q in 0..config.qubits {
            out.push_str(&format!("measure q[{q}];\n"));
        }
    }
    out
}
