//! Phase-aware products of Pauli rows.
//!
//! Multiplying two single-qubit Pauli letters introduces a power of **i**;
//! over *n* qubits the exponents add. Folded together with the two stored
//! sign bits, the total is always even, and its value mod 4 fixes the sign
//! of the product row.

use crate::{ error::EngineError, store::TableauStore };

/// Exponent on **i** picked up when the Pauli letter encoded by `(x1, z1)`
/// is multiplied by the letter encoded by `(x2, z2)`, where (0,0) → I,
/// (1,0) → X, (0,1) → Z, and (1,1) → Y.
///
/// The result is always −1, 0, or +1.
pub fn g(x1: bool, z1: bool, x2: bool, z2: bool) -> i8 {
    let x2 = i8::from(x2);
    let z2 = i8::from(z2);
    match (x1, z1) {
        (false, false) => 0,
        (true, false) => z2 * (2 * x2 - 1),
        (false, true) => x2 * (1 - 2 * z2),
        (true, true) => z2 - x2,
    }
}

/// Replace row `h` with the product of row `i` and row `h`, folding the
/// accumulated i-exponent into the sign bit of `h`.
///
/// The accumulator must land on 0 or 2 mod 4; an odd value cannot arise from
/// a well-formed generator set and is reported as
/// [`EngineError::EngineInvariant`]. Rows may include the scratch row.
pub(crate) fn rowsum(t: &mut TableauStore, h: usize, i: usize) -> Result<(), EngineError> {
    debug_assert!(h != i);
    let n = t.num_qubits();
    let mut acc: i32 = 2 * (i32::from(t.r(h)) + i32::from(t.r(i)));
    for j in 1..=n {
        acc += i32::from(g(t.x(i, j), t.z(i, j), t.x(h, j), t.z(h, j)));
    }
    match acc.rem_euclid(4) {
        0 => t.put_r(h, false),
        2 => t.put_r(h, true),
        m => return Err(EngineError::EngineInvariant(m)),
    }
    for j in 1..=n {
        let x = t.x(h, j) ^ t.x(i, j);
        let z = t.z(h, j) ^ t.z(i, j);
        t.put_x(h, j, x);
        t.put_z(h, j, z);
    }
    Ok(())
}
