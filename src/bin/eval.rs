use clap::Parser;
use env_logger::Env;
use evallib::{io, stats::Aggregates, UndefinedPathPolicy};
use log::{error, info};
use std::path::PathBuf;

#[derive(clap::Parser)]
#[command(name = "lightning-eval", version, about)]
struct Cli {
    /// Path to the directory containing the simulator's runX.json files
    #[arg(long = "input", short = 'i')]
    input_dir: PathBuf,
    /// Path to directory in which the aggregate tables will be stored
    #[arg(long = "out", short = 'o')]
    output_dir: Option<PathBuf>,
    /// What a failed payment without recorded paths contributes to the
    /// path-length table
    #[arg(long = "undefined-paths", default_value = "emit")]
    undefined_paths: UndefinedPathPolicy,
    #[arg(long = "log", short = 'l', default_value = "info")]
    log_level: String,
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let args = Cli::parse();
    let log_level = args.log_level;
    let env = Env::default()
        .filter_or("MY_LOG_LEVEL", log_level)
        .write_style_or("MY_LOG_STYLE", "always");
    env_logger::init_from_env(env);

    let results = match io::read_results_from_dir(&args.input_dir) {
        Ok(results) => results,
        Err(e) => {
            error!("Error reading {:#?}: {}. Exiting.", args.input_dir, e);
            std::process::exit(-1)
        }
    };
    if results.is_empty() {
        error!("No usable run files in {:#?}. Exiting.", args.input_dir);
        std::process::exit(-1)
    }
    info!("Aggregating {} runs.", results.len());
    let aggregates = Aggregates::compute(&results, args.undefined_paths);
    let output_dir = if let Some(output_dir) = args.output_dir {
        output_dir
    } else {
        PathBuf::from("results")
    };
    info!(
        "Aggregate tables will be written to {:#?}/ directory.",
        output_dir
    );
    if let Err(e) = io::Output(&aggregates).write(output_dir) {
        error!("Error writing aggregate tables: {}. Exiting.", e);
        std::process::exit(-1)
    }
    info!("Successfully aggregated all metric families.");
}
