use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{info, Level};

use yacht::constants::{UPPER_SUM_MAX, USED_MASK_MAX};
use yacht::env_config;
use yacht::phase0_tables::PatternTables;
use yacht::state_computation::compute_all_state_values;
use yacht::storage::{file_exists, save_manifest, save_table, TableFormat, TableManifest};
use yacht::types::{RerollRule, SolverConfig};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    /// Header + f64 values (lossless)
    Headered,
    /// Bare f32 values, for embedding
    RawF32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RuleArg {
    /// Kept dice stay kept for the rest of the turn
    LockKept,
    /// Any die may be rerolled at each keep decision
    FreeReroll,
}

#[derive(Parser, Debug)]
#[command(
    name = "yacht-precompute",
    version,
    about = "Compute the optimal-play expected-value table for Yacht"
)]
struct Cli {
    /// Output table file (relative to YACHT_BASE_PATH)
    #[arg(short, long, value_name = "PATH", default_value = "data/yacht_dp_table.bin")]
    output: PathBuf,
    /// Table file layout
    #[arg(short, long, value_enum, default_value_t = FormatArg::Headered)]
    format: FormatArg,
    /// Which dice a keep decision may choose from
    #[arg(long, value_enum, default_value_t = RuleArg::LockKept)]
    reroll_rule: RuleArg,
    /// Worker threads (overrides RAYON_NUM_THREADS / OMP_NUM_THREADS)
    #[arg(short = 'j', long)]
    threads: Option<usize>,
    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
    /// Compute and print the initial value without writing the table
    #[arg(long)]
    no_save: bool,
    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    info!("Yacht precomputation tool");
    env_config::init_base_path().context("failed to enter YACHT_BASE_PATH")?;

    let threads = cli.threads.unwrap_or_else(env_config::threads_from_env);
    env_config::init_rayon_threads(threads).context("failed to build rayon thread pool")?;

    let config = SolverConfig {
        reroll_rule: match cli.reroll_rule {
            RuleArg::LockKept => RerollRule::LockKept,
            RuleArg::FreeReroll => RerollRule::FreeReroll,
        },
        show_progress: !cli.no_progress,
    };
    let format = match cli.format {
        FormatArg::Headered => TableFormat::Headered,
        FormatArg::RawF32 => TableFormat::RawF32,
    };

    let tables = PatternTables::new();
    let start = Instant::now();
    let table = compute_all_state_values(&tables, &config);
    let solve_seconds = start.elapsed().as_secs_f64();

    if !cli.no_save {
        if file_exists(&cli.output) {
            info!("Overwriting {}", cli.output.display());
        }
        save_table(&table, &cli.output, format)
            .with_context(|| format!("failed to write {}", cli.output.display()))?;
        let manifest = TableManifest {
            format,
            rows: UPPER_SUM_MAX,
            cols: USED_MASK_MAX,
            reroll_rule: config.reroll_rule,
            initial_value: table.initial_value(),
            solve_seconds,
        };
        save_manifest(&cli.output, &manifest).context("failed to write table manifest")?;
    }

    println!("{:.15}", table.initial_value());
    Ok(())
}
