use std::path::PathBuf;

use clap::{Parser, Subcommand};
use storefront_etl::config::{
    DEFAULT_PATCH_PATH, DEFAULT_PRIMARY_PATH, DEFAULT_SNAPSHOT_PATH, EtlConfig,
};
use storefront_etl::io::{excel_write, samples};
use storefront_etl::pipeline::Pipeline;
use storefront_etl::{EtlError, Result};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| EtlError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Init(paths) => execute_init(paths.into()),
        Command::Run(paths) => execute_run(paths.into()),
        Command::Show(paths) => execute_show(paths.into()),
        Command::Export(args) => execute_export(args),
    }
}

fn execute_init(config: EtlConfig) -> Result<()> {
    let created = samples::write_samples(&config)?;
    if created.is_empty() {
        println!("sample sources already present");
    }
    for path in created {
        println!("created {}", path.display());
    }
    Ok(())
}

fn execute_run(config: EtlConfig) -> Result<()> {
    let pipeline = Pipeline::new(config);
    let report = pipeline.run();
    if !report.persisted {
        warn!(
            snapshot = %pipeline.config().snapshot_path.display(),
            "snapshot was not written; `show` will return the previous run"
        );
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn execute_show(config: EtlConfig) -> Result<()> {
    let records = Pipeline::new(config).get()?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

fn execute_export(args: ExportArgs) -> Result<()> {
    let records = Pipeline::new(args.paths.into()).get()?;
    excel_write::write_products(&args.output, &records)?;
    println!(
        "exported {} products to {}",
        records.len(),
        args.output.display()
    );
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Consolidate a primary product catalog with a patch source."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the reference sample sources if they do not exist yet.
    Init(PathArgs),
    /// Rebuild the consolidated snapshot from both sources.
    Run(PathArgs),
    /// Print the last persisted snapshot as JSON.
    Show(PathArgs),
    /// Export the last persisted snapshot to an Excel workbook.
    Export(ExportArgs),
}

#[derive(clap::Args)]
struct PathArgs {
    /// Primary catalog (JSON array).
    #[arg(long, default_value = DEFAULT_PRIMARY_PATH)]
    primary: PathBuf,

    /// Patch source (JSON array).
    #[arg(long, default_value = DEFAULT_PATCH_PATH)]
    patch: PathBuf,

    /// Consolidated snapshot location.
    #[arg(long, default_value = DEFAULT_SNAPSHOT_PATH)]
    snapshot: PathBuf,
}

impl From<PathArgs> for EtlConfig {
    fn from(args: PathArgs) -> Self {
        EtlConfig {
            primary_path: args.primary,
            patch_path: args.patch,
            snapshot_path: args.snapshot,
        }
    }
}

#[derive(clap::Args)]
struct ExportArgs {
    #[command(flatten)]
    paths: PathArgs,

    /// Output workbook path.
    #[arg(long)]
    output: PathBuf,
}
