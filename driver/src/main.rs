//! Command-line driver for the tableau engine.
//!
//! With `--input` the named circuit file is executed `--num-shots` times and
//! the outcome-string frequencies are printed in lexicographic order (shots
//! run on independent engines in parallel). Without `--input` the driver
//! reads gate commands interactively from standard input.

use std::{
    fs,
    io::{ self, BufRead, Write },
    path::{ Path, PathBuf },
    process::ExitCode,
};
use clap::Parser;
use itertools::Itertools;
use rayon::prelude::*;
use tableau_sim::circuit::{ self, Circuit, CircuitError, MeasRecord };
use tableau_sim::tableau::{ ImprovedTableau, StabilizerTableau };
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt, EnvFilter };

/// Simulate stabilizer circuits written in the OPENQASM-3 subset.
#[derive(Debug, Parser)]
#[command(name = "tableau-sim", version, about)]
struct Cli {
    /// Circuit file to execute; omit to enter interactive mode.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Write the result here instead of standard output.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of times to run the circuit, aggregating outcome frequencies.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    num_shots: u64,

    /// Measurement-randomness seed; shot k draws from seed + k.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<(), CircuitError> {
    match &cli.input {
        Some(path) => batch(path, &cli),
        None => interactive(&cli),
    }
}

fn new_engine(n: usize, seed: Option<u64>, shot: u64) -> Result<ImprovedTableau, CircuitError> {
    let tab = match seed {
        Some(s) => ImprovedTableau::with_seed(n, s.wrapping_add(shot))?,
        None => ImprovedTableau::new(n)?,
    };
    Ok(tab)
}

fn batch(path: &Path, cli: &Cli) -> Result<(), CircuitError> {
    let src = fs::read_to_string(path)?;
    let parsed = Circuit::parse(&src)?;
    tracing::info!(
        qubits = parsed.num_qubits(),
        shots = cli.num_shots,
        "executing circuit"
    );

    let outcomes: Vec<String> = (0..cli.num_shots)
        .into_par_iter()
        .map(|shot| {
            let mut tab = new_engine(parsed.num_qubits(), cli.seed, shot)?;
            parsed.run(&mut tab)
        })
        .collect::<Result<_, _>>()?;

    let mut report = String::new();
    for (count, outcome) in outcomes.into_iter().sorted().dedup_with_count() {
        report.push_str(&format!("{outcome} {count}\n"));
    }
    emit(cli.output.clone(), report)
}

fn prompt(text: &str) -> Result<(), CircuitError> {
    let mut stdout = io::stdout();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn interactive(cli: &Cli) -> Result<(), CircuitError> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let n = loop {
        prompt("Initialize the qubit register in QASM3 format: qreg q[n];\n> ")?;
        let Some(line) = lines.next() else { return Ok(()) };
        let line = line?;
        match circuit::parse_qreg(line.trim()) {
            Some(n) => break n,
            None => println!("Error: Incorrect format. Expected format: qreg q[n];"),
        }
    };

    let mut tab = new_engine(n, cli.seed, 0)?;
    let mut record = MeasRecord::new(n);
    println!(
        "Initialized circuit with {n} qubits.\n\
         Available commands:\n\
         Gates id, h, s, x, y, z, cx, swap and measure applied to qubits in QASM3 format.\n\
         exit|quit => Terminate and print the current measurement string.\n\
         finish|measure all => Measure all remaining qubits and print the measurement string."
    );

    loop {
        prompt("> ")?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            "exit" | "quit" => break,
            "finish" | "measure all" => {
                for q in 0..n {
                    if record.is_pending(q) {
                        let outcome = tab.measure(q + 1)?;
                        record.record(q, outcome.bit());
                    }
                }
                break;
            },
            _ => match circuit::parse_stmt(line) {
                Some(op) => op.apply(&mut tab, &mut record)?,
                None => println!("Error: Invalid input."),
            },
        }
    }
    emit(cli.output.clone(), format!("{record}\n"))
}

fn emit(path: Option<PathBuf>, contents: String) -> Result<(), CircuitError> {
    match path {
        Some(path) => fs::write(path, contents)?,
        None => prompt(&contents)?,
    }
    Ok(())
}
