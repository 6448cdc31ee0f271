//! Discontinuity Detection via Local Kernel Persistence
//!
//! Samples a map, computes local kernel persistence around test points,
//! scores every point and writes one line per point to the configured
//! output file.
//!
//! ## Usage
//!
//! ```bash
//! detect_discontinuities --domain uniform 21 --map linear_fold1d 2 --test uniform 21
//! detect_discontinuities runs.txt    # one parameter string per line
//! ```
//!
//! Run-list lines are split on whitespace, so values in a list file cannot
//! contain spaces. Set `RUST_LOG=tda_discontinuity=debug` for per-point
//! diagnostics.

use anyhow::{ensure, Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tda_discontinuity::{run, write_results_to_file, RunArgs, RunConfig};
use tracing::info;

#[derive(Parser)]
#[command(name = "detect_discontinuities", args_override_self = true)]
#[command(about = "Detect discontinuities of sampled maps with local kernel persistence")]
struct Cli {
    /// File holding one parameter line per run, instead of parameters
    run_list: Option<PathBuf>,

    #[command(flatten)]
    params: RunArgs,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tda_discontinuity=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    match cli.run_list {
        Some(path) => {
            ensure!(
                cli.params == RunArgs::default(),
                "a run list cannot be combined with parameters"
            );
            run_list(&path)
        }
        None => {
            let config = RunConfig::from_args(&cli.params).context("invalid parameters")?;
            run_config(&config)
        }
    }
}

fn run_list(path: &Path) -> Result<()> {
    let list = fs::read_to_string(path).with_context(|| format!("cannot read run list {}", path.display()))?;
    let lines = list
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'));
    for (index, line) in lines.enumerate() {
        let config = RunConfig::parse(line).with_context(|| format!("invalid parameters: {}", line))?;
        run_config(&config).with_context(|| format!("run {} of {}", index + 1, path.display()))?;
    }
    Ok(())
}

fn run_config(config: &RunConfig) -> Result<()> {
    info!(?config, "run");

    let data = run(config)?;
    write_results_to_file(&config.output, &data)?;

    let flagged = data.iter().filter(|d| d.is_discontinuity()).count();
    info!(
        points = data.len(),
        flagged,
        output = %config.output.display(),
        "results written"
    );
    Ok(())
}
