use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use voledoku::field::FieldConfig;
use voledoku::prove_board;
use voledoku::sudoku::generator::random_solved_board;
use voledoku::sudoku::{Check0Validator, PitValidator};
use voledoku::vole::seed_from_label;

#[derive(Parser)]
#[command(name = "voledoku", about = "VOLE-backed sudoku proofs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs both validators on one fresh board and reports tape usage
    Compare {
        /// Label hashed into the RNG seed, for reproducible runs
        #[arg(long)]
        seed: Option<String>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generates a solved board and proves its validity with one strategy
    Prove {
        #[arg(long, value_enum, default_value_t = Strategy::Pit)]
        strategy: Strategy,
        /// Label hashed into the RNG seed, for reproducible runs
        #[arg(long)]
        seed: Option<String>,
        /// Print the generated board before proving
        #[arg(long)]
        show_board: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    /// Polynomial identity test in GF(2^64)
    Pit,
    /// Sum-of-powers check-zero in GF(2^8)
    Check0,
}

#[derive(Serialize)]
struct StrategyReport {
    strategy: &'static str,
    valid: bool,
    slots_used: usize,
}

#[derive(Serialize)]
struct CompareReport {
    pit: StrategyReport,
    check0: StrategyReport,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Compare { seed, json } => compare(seed, json),
        Command::Prove {
            strategy,
            seed,
            show_board,
        } => prove(strategy, seed, show_board),
    }
}

fn rng_from(seed: Option<String>) -> ChaCha20Rng {
    match seed {
        Some(label) => ChaCha20Rng::from_seed(seed_from_label(&label)),
        None => ChaCha20Rng::from_entropy(),
    }
}

/// Both strategies run in GF(2^8) on the same board so the slot counts are
/// directly comparable; Check0 is infeasible at larger m.
fn compare(seed: Option<String>, json: bool) -> Result<()> {
    let mut rng = rng_from(seed);
    let field = FieldConfig::new(8);
    let board = random_solved_board(&mut rng);

    let pit = prove_board(field, 4096, &PitValidator::new(), &board, &mut rng)?;
    let check0_validator = Check0Validator::new(field);
    let check0 = prove_board(field, 1 << 16, &check0_validator, &board, &mut rng)?;

    let report = CompareReport {
        pit: StrategyReport {
            strategy: "pit",
            valid: pit.valid,
            slots_used: pit.slots_used,
        },
        check0: StrategyReport {
            strategy: "check0",
            valid: check0.valid,
            slots_used: check0.slots_used,
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "PIT method used {} tape slots. Valid: {}",
            report.pit.slots_used, report.pit.valid
        );
        println!(
            "Check0 method used {} tape slots. Valid: {}",
            report.check0.slots_used, report.check0.valid
        );
    }
    Ok(())
}

fn prove(strategy: Strategy, seed: Option<String>, show_board: bool) -> Result<()> {
    let mut rng = rng_from(seed);
    let board = random_solved_board(&mut rng);
    if show_board {
        for row in &board {
            let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            println!("{}", cells.join(" "));
        }
    }

    let run = match strategy {
        Strategy::Pit => {
            let field = FieldConfig::new(64);
            prove_board(field, 4096, &PitValidator::new(), &board, &mut rng)?
        }
        Strategy::Check0 => {
            let field = FieldConfig::new(8);
            let validator = Check0Validator::new(field);
            prove_board(field, 1 << 16, &validator, &board, &mut rng)?
        }
    };

    println!("Is valid: {}", run.valid);
    println!("Used {} tape slots", run.slots_used);
    Ok(())
}
