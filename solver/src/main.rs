//! Color a wall layout from the command line.
//!
//! Usage:
//!   solver --palette <FILE> --walls <FILE> [--output <FILE>]

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use vermilion::interchange::{palette_from_json, walls_from_json, walls_to_json};
use vermilion::SolverConfig;

#[derive(Parser)]
#[command(name = "solver")]
#[command(about = "Assign palette colors to wall routes so that nearby routes differ")]
struct Cli {
    /// Palette document (JSON)
    #[arg(short, long)]
    palette: PathBuf,

    /// Wall layout document (JSON)
    #[arg(short, long)]
    walls: PathBuf,

    /// Write the solved wall layout here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Give up on encodings with more boolean variables than this
    #[arg(long)]
    max_variables: Option<usize>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(message) => {
            error!("{message}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether a coloring was found.
fn run(cli: &Cli) -> Result<bool, String> {
    let read = |path: &PathBuf| fs::read_to_string(path).map_err(|e| format!("cannot read '{}': {e}", path.display()));

    let palette = palette_from_json(&read(&cli.palette)?).map_err(|e| format!("{}: {e}", cli.palette.display()))?;
    let mut walls = walls_from_json(&read(&cli.walls)?).map_err(|e| format!("{}: {e}", cli.walls.display()))?;

    let mut config = SolverConfig::default();
    if let Some(max_variables) = cli.max_variables {
        config = config.with_max_variables(max_variables);
    }

    let solution = walls.solve(palette, &config);
    if let Some(diagnostic) = solution.diagnostic() {
        println!("{diagnostic}");
        return Ok(false);
    }

    for route in walls.routes() {
        let color = route.assigned_color().map_or_else(|| String::from("-"), |c| c.to_string());
        println!("{}\t{}{}", route.display_name(), color, if route.is_fixed() { "\t(fixed)" } else { "" });
    }

    if let Some(output) = &cli.output {
        let json = walls_to_json(&walls).map_err(|e| e.to_string())?;
        fs::write(output, json).map_err(|e| format!("cannot write '{}': {e}", output.display()))?;
    }

    Ok(true)
}
