//! evalplot CLI - render the evaluation summary charts

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use evalplot::{
    config::{load_config_from_file, save_config_to_file},
    error::ReportResult,
    generate_report, init, ReportConfig,
};

#[derive(Parser)]
#[command(name = "evalplot")]
#[command(about = "Render bar charts from a model evaluation summary")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration as a template
    Config {
        /// Output path for configuration file
        #[arg(short, long, default_value = "./evalplot_config.json")]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> ReportResult<()> {
    let config = match cli.config {
        Some(ref path) => load_config_from_file(path)?,
        None => ReportConfig::default(),
    };

    init(cli.verbose || config.development.verbose_logging);
    if let Some(ref path) = cli.config {
        info!("Using configuration from {:?}", path);
    }

    match cli.command {
        Some(Commands::Config { output }) => generate_config(&config, &output),
        None => render(&config),
    }
}

fn render(config: &ReportConfig) -> ReportResult<()> {
    info!("Reading summary from {:?}", config.input.summary_path);
    let outcome = generate_report(config)?;
    println!("Saved visualizations to: {}", outcome.output_dir.display());
    Ok(())
}

fn generate_config(config: &ReportConfig, output: &PathBuf) -> ReportResult<()> {
    save_config_to_file(config, output)?;
    println!("Configuration template written to: {}", output.display());
    Ok(())
}
