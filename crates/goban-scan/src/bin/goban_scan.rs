//! goban-scan CLI: read a Go position from a board photograph.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use goban_scan::core::{parse_level, BoardCorners, CornerOrder};
#[cfg(feature = "tracing")]
use goban_scan::core::init_tracing;
#[cfg(not(feature = "tracing"))]
use goban_scan::core::init_with_level;
use goban_scan::detect;
use goban_scan::io::{load_params, ScanConfig};
use log::LevelFilter;

#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "goban-scan")]
#[command(about = "Read a 19x19 Go position from a photograph and print it as SGF")]
#[command(version)]
struct Cli {
    /// Log level for diagnostics on stderr: a level name, `quiet`, or 0-5.
    #[arg(long, global = true, default_value = "warn", value_parser = parse_level)]
    log_level: LevelFilter,

    /// Emit diagnostics as JSON lines.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan one photo given its four board corners.
    Scan(CliScanArgs),

    /// Run a scan described by a JSON config file.
    Run {
        /// Path to the scan config (JSON).
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct CliScanArgs {
    /// Path to the board photo.
    image: PathBuf,

    /// Eight comma separated numbers: four `x,y` corner pairs.
    #[arg(long, allow_hyphen_values = true)]
    corners: String,

    /// Layout of the corner pairs (`cyclic` = a,b,c,d; `detector` = d,a,c,b).
    #[arg(long, default_value = "cyclic")]
    order: CornerOrder,

    /// Scan parameters (JSON). Missing fields take defaults.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Write the SGF here instead of stdout.
    #[arg(long)]
    sgf: Option<PathBuf>,

    /// Write a PNG overlay of the classification.
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Write the full scan result (JSON).
    #[arg(long)]
    report: Option<PathBuf>,
}

impl CliScanArgs {
    fn to_config(&self) -> CliResult<ScanConfig> {
        let corners = BoardCorners::parse(&self.corners, self.order)?;
        let mut config = ScanConfig::new(
            self.image.to_string_lossy(),
            corners.to_values(self.order).to_vec(),
        );
        config.corner_order = Some(self.order);
        if let Some(path) = &self.params {
            config.params = load_params(path)?;
        }
        let path_string = |p: &PathBuf| p.to_string_lossy().into_owned();
        config.sgf_path = self.sgf.as_ref().map(path_string);
        config.overlay_path = self.overlay.as_ref().map(path_string);
        config.report_path = self.report.as_ref().map(path_string);
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    if let Err(err) = run(cli.command) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> CliResult<()> {
    let config = match command {
        Commands::Scan(args) => args.to_config()?,
        Commands::Run { config } => ScanConfig::load_json(&config)?,
    };
    let result = detect::execute(&config)?;
    if config.sgf_path.is_none() {
        println!("{}", result.to_sgf());
    }
    Ok(())
}

fn init_logging(cli: &Cli) {
    #[cfg(feature = "tracing")]
    {
        init_tracing(cli.log_json, cli.log_level);
        // No-op when the subscriber already bridged `log` records.
        let _ = LogTracer::init();
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = init_with_level(cli.log_level);
    }
}
