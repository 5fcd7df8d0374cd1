use std::fs::read_to_string;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dealpack::{Problem, SolveOptions};

/// Allocate deals to purchasers using Mixed Integer Linear Programming.
#[derive(Debug, Parser)]
#[command(name = "dealpack")]
struct Args {
    /// YAML file describing the deals and purchasers.
    input: PathBuf,

    /// Wall-clock limit handed to the solver, in seconds.
    #[arg(long, default_value_t = 60)]
    time_limit: u64,

    /// Minimum acceptable optimality gap. Accepted for forward
    /// compatibility but not currently forwarded to the solver.
    #[arg(long)]
    target_gap: Option<f64>,

    /// Do not require every large-enough purchaser to receive a deal.
    #[arg(long)]
    skip_min_deal: bool,

    /// Ignore purchaser preferences between deal kinds.
    #[arg(long)]
    skip_pref_penalty: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let buf = read_to_string(&args.input)?;
    let problem: Problem = serde_yaml::from_str(&buf)?;

    let options = SolveOptions {
        time_limit_secs: Some(args.time_limit),
        target_gap: args.target_gap,
        min_deal: !args.skip_min_deal,
        pref_penalty: !args.skip_pref_penalty,
    };

    let allocation = problem.solve(&options)?;
    println!("{}", serde_yaml::to_string(&allocation)?);
    Ok(())
}
