//! Errors raised by the tableau engine.

use thiserror::Error;

/// Failure of an engine operation.
///
/// `InvalidArgument` is always detected before any mutation, so the tableau
/// is unchanged when it is returned. `EngineInvariant` means the generator
/// set itself is corrupt; the tableau should be discarded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A caller-supplied value was rejected up front.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A store access fell outside the declared row/qubit range. `qubit` is
    /// 0 for accesses to a row-wide bit.
    #[error("tableau access out of range: row {row}, qubit {qubit}")]
    IndexOutOfRange { row: usize, qubit: usize },

    /// The rowsum accumulator came out odd mod 4, which the Pauli group
    /// forbids for commuting generator products.
    #[error("rowsum accumulator congruent to {0} mod 4; engine state is undefined")]
    EngineInvariant(i32),
}
