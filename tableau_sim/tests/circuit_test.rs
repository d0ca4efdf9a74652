use tableau_sim::circuit::{
    execute_circuit, parse_qreg, parse_stmt, random_circuit, validate_circuit,
    Circuit, CircuitError, Op, RandomCircuitConfig,
};
use tableau_sim::error::EngineError;
use tableau_sim::gate::Gate;
use tableau_sim::tableau::ImprovedTableau;

fn circuit(body: &[&str], n: usize) -> String {
    let mut src = format!("OPENQASM 3;\nqreg q[{n}];\n");
    for line in body {
        src.push_str(line);
        src.push('\n');
    }
    src
}

#[test]
fn pauli_x_measures_one() {
    let src = circuit(&["x q[0];", "measure q[0];"], 1);
    assert_eq!(execute_circuit(&src, Some(0)).unwrap(), "1");
}

#[test]
fn bell_pair_outcomes_are_correlated() {
    let src = circuit(
        &["h q[0];", "cx q[0],q[1];", "measure q[0];", "measure q[1];"],
        2,
    );
    let mut seen = [0_usize; 2];
    for seed in 0..60 {
        let out = execute_circuit(&src, Some(seed)).unwrap();
        assert!(out == "00" || out == "11", "got {out}");
        seen[usize::from(out == "11")] += 1;
    }
    assert!(seen[0] > 10 && seen[1] > 10);
}

#[test]
fn ghz_five_collapses_together() {
    let src = circuit(
        &[
            "h q[0];",
            "cx q[0],q[1];",
            "cx q[1],q[2];",
            "cx q[2],q[3];",
            "cx q[3],q[4];",
            "measure q[0];",
            "measure q[1];",
            "measure q[2];",
            "measure q[3];",
            "measure q[4];",
        ],
        5,
    );
    for seed in 0..30 {
        let out = execute_circuit(&src, Some(seed)).unwrap();
        assert!(out == "00000" || out == "11111", "got {out}");
    }
}

#[test]
fn double_hadamard_is_deterministic_zero() {
    let src = circuit(&["h q[0];", "h q[0];", "measure q[0];"], 1);
    for seed in 0..20 {
        assert_eq!(execute_circuit(&src, Some(seed)).unwrap(), "0");
    }
}

#[test]
fn repeated_measurement_repeats_the_bit() {
    let src = circuit(&["h q[0];", "measure q[0];", "measure q[0];"], 1);
    let mut seen = [false; 2];
    for seed in 0..40 {
        let out = execute_circuit(&src, Some(seed)).unwrap();
        assert!(out == "0" || out == "1");
        seen[usize::from(out == "1")] = true;
    }
    assert!(seen[0] && seen[1]);
}

#[test]
fn derived_gates_measure_110() {
    let src = circuit(
        &[
            "x q[0];",
            "y q[1];",
            "z q[2];",
            "measure q[0];",
            "measure q[1];",
            "measure q[2];",
        ],
        3,
    );
    assert_eq!(execute_circuit(&src, Some(5)).unwrap(), "110");
}

#[test]
fn unmeasured_qubits_stay_x() {
    let src = circuit(&["x q[1];", "measure q[1];"], 3);
    assert_eq!(execute_circuit(&src, Some(0)).unwrap(), "x1x");
}

#[test]
fn gates_invalidate_prior_outcomes() {
    let src = circuit(&["x q[0];", "measure q[0];", "h q[0];"], 1);
    assert_eq!(execute_circuit(&src, Some(0)).unwrap(), "x");

    // the identity does not disturb a recorded outcome
    let src = circuit(&["x q[0];", "measure q[0];", "id q[0];"], 1);
    assert_eq!(execute_circuit(&src, Some(0)).unwrap(), "1");

    // a swap clears both of its qubits
    let src = circuit(
        &["x q[0];", "measure q[0];", "measure q[1];", "swap q[0],q[1];"],
        2,
    );
    assert_eq!(execute_circuit(&src, Some(0)).unwrap(), "xx");
}

#[test]
fn swap_moves_the_excitation() {
    let src = circuit(
        &["x q[0];", "swap q[0],q[1];", "measure q[0];", "measure q[1];"],
        2,
    );
    assert_eq!(execute_circuit(&src, Some(0)).unwrap(), "01");
}

#[test]
fn header_and_qreg_lines_are_mandatory() {
    let err = execute_circuit("h q[0];\n", None).unwrap_err();
    assert!(matches!(err, CircuitError::Parse { number: 1, .. }));

    let err = execute_circuit("OPENQASM 3;\n", None).unwrap_err();
    assert!(matches!(err, CircuitError::Parse { number: 2, .. }));

    let err = execute_circuit("OPENQASM 3;\nqreg p[2];\n", None).unwrap_err();
    assert!(matches!(err, CircuitError::Parse { number: 2, .. }));
}

#[test]
fn internal_spacing_is_significant() {
    let err = execute_circuit(&circuit(&["h  q[0];"], 1), None).unwrap_err();
    assert!(matches!(err, CircuitError::Parse { number: 3, .. }));

    let err = execute_circuit(&circuit(&["cx q[0], q[1];"], 2), None).unwrap_err();
    assert!(matches!(err, CircuitError::Parse { number: 3, .. }));

    // surrounding whitespace is fine
    let out = execute_circuit(&circuit(&["  x q[0];  ", "", "measure q[0];"], 1), Some(0));
    assert_eq!(out.unwrap(), "1");
}

#[test]
fn non_clifford_gates_are_rejected() {
    let err = execute_circuit(&circuit(&["t q[0];"], 1), None).unwrap_err();
    assert!(matches!(err, CircuitError::Parse { number: 3, .. }));
}

#[test]
fn engine_errors_pass_through_the_executor() {
    let err = execute_circuit(&circuit(&["cx q[0],q[0];"], 2), None).unwrap_err();
    assert!(matches!(
        err,
        CircuitError::Engine(EngineError::InvalidArgument(_)),
    ));

    let err = execute_circuit(&circuit(&["h q[5];"], 2), None).unwrap_err();
    assert!(matches!(
        err,
        CircuitError::Engine(EngineError::InvalidArgument(_)),
    ));

    let err = execute_circuit("OPENQASM 3;\nqreg q[0];\n", None).unwrap_err();
    assert!(matches!(
        err,
        CircuitError::Engine(EngineError::InvalidArgument(_)),
    ));
}

#[test]
fn run_checks_the_backend_width() {
    let parsed = Circuit::parse(&circuit(&["h q[0];"], 3)).unwrap();
    let mut tab = ImprovedTableau::with_seed(2, 0).unwrap();
    assert!(matches!(
        parsed.run(&mut tab),
        Err(CircuitError::Engine(EngineError::InvalidArgument(_))),
    ));
}

#[test]
fn statement_parsing_round_trips_gate_display() {
    for gate in [
        Gate::Id(0),
        Gate::H(1),
        Gate::S(2),
        Gate::X(3),
        Gate::Y(4),
        Gate::Z(5),
        Gate::CX(0, 7),
        Gate::Swap(3, 1),
    ] {
        assert_eq!(parse_stmt(&gate.to_string()), Some(Op::Gate(gate)));
    }
    assert_eq!(parse_stmt("measure q[2];"), Some(Op::Measure(2)));
    assert_eq!(parse_qreg("qreg q[12];"), Some(12));
    assert_eq!(parse_qreg("qreg q[];"), None);
}

#[test]
fn validator_sorts_bad_lines_by_kind() {
    let good = circuit(&["  h q[0];  ", "measure q[0];"], 1);
    let normalized = validate_circuit(&good).unwrap();
    assert_eq!(normalized, "OPENQASM 3;\nqreg q[1];\nh q[0];\nmeasure q[0];\n");

    let err = validate_circuit(&circuit(&["h q[0],q[1];"], 2)).unwrap_err();
    assert!(matches!(err, CircuitError::Unsupported { number: 3, .. }));

    let err = validate_circuit(&circuit(&["ry(0.3) q[0];"], 1)).unwrap_err();
    assert!(matches!(err, CircuitError::Parse { number: 3, .. }));

    let err = validate_circuit("OPENQASM 3;\n").unwrap_err();
    assert!(matches!(err, CircuitError::Parse { number: 2, .. }));
}

#[test]
fn validator_rejects_blank_statement_lines() {
    // the executor skips a blank line, but the write path refuses it
    let src = circuit(&["h q[0];", "", "measure q[0];"], 1);
    assert!(execute_circuit(&src, Some(0)).is_ok());
    let err = validate_circuit(&src).unwrap_err();
    assert!(matches!(err, CircuitError::Parse { number: 4, .. }));
}

#[test]
fn random_circuits_parse_and_execute() {
    let config = RandomCircuitConfig {
        qubits: 4,
        depth: 120,
        gate_seed: 1,
        qubit_seed: 2,
        intermediate_measurements: true,
        measure_all_at_end: true,
    };
    let src = random_circuit(&config);
    assert_eq!(src, random_circuit(&config));
    validate_circuit(&src).unwrap();
    // every drawn statement plus the four closing measurements
    assert_eq!(Circuit::parse(&src).unwrap().ops().len(), 124);

    let out = execute_circuit(&src, Some(3)).unwrap();
    assert_eq!(out.len(), 4);
    assert!(out.bytes().all(|b| b == b'0' || b == b'1'));
}

#[test]
fn random_circuits_respect_their_switches() {
    let config = RandomCircuitConfig {
        qubits: 1,
        depth: 200,
        gate_seed: 7,
        qubit_seed: 8,
        intermediate_measurements: false,
        measure_all_at_end: false,
    };
    let src = random_circuit(&config);
    assert!(!src.contains("measure"));
    assert!(!src.contains("cx"));
    assert!(!src.contains("swap"));
    let out = execute_circuit(&src, Some(0)).unwrap();
    assert_eq!(out, "x");
}
