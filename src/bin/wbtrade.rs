use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use wbtrade::api::DEFAULT_BASE_URL;
use wbtrade::normalize::MalformedPolicy;
use wbtrade::pipeline::assemble;
use wbtrade::{Client, CountrySet, Figure, FigureBuilder, Indicator, storage};

#[derive(Parser, Debug)]
#[command(
    name = "wbtrade",
    version,
    about = "Build chart descriptors for World Bank trade indicators"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the four indicators and emit the figures as JSON.
    Figures(FiguresArgs),
    /// Print the four request URLs without fetching.
    Urls(SourceArgs),
    /// Rebuild the figures from CSV tables saved by `figures --tables-dir`.
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Countries as NAME=CODE pairs separated by comma or semicolon
    /// (e.g., "Japan=JPN,Laos=LAO"). Defaults to 13 Asian economies.
    #[arg(short, long, default_value = "")]
    countries: CountrySet,
    /// API base URL.
    #[arg(long, env = "WBTRADE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

#[derive(Args, Debug)]
struct FiguresArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Write the figures to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Also save each indicator's table as CSV into this directory.
    #[arg(long)]
    tables_dir: Option<PathBuf>,
    /// Fail an indicator on malformed records instead of skipping them.
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Total request timeout in seconds (default: none).
    #[arg(long)]
    timeout: Option<u64>,
    /// Pretty-print JSON written to stdout.
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Directory holding `<metric>.csv` tables.
    #[arg(long)]
    tables_dir: PathBuf,
    /// Write the figures to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Pretty-print JSON written to stdout.
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Figures(args) => cmd_figures(args),
        Command::Urls(args) => cmd_urls(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_urls(args: SourceArgs) -> Result<()> {
    let builder = FigureBuilder::new(Client::default()).base_url(args.base_url);
    for url in builder.urls(&args.countries) {
        println!("{}", url);
    }
    Ok(())
}

fn cmd_figures(args: FiguresArgs) -> Result<()> {
    let client = Client::with_timeout(args.timeout.map(Duration::from_secs))
        .context("build http client")?;
    let policy = if args.strict {
        MalformedPolicy::Fail
    } else {
        MalformedPolicy::Skip
    };
    let builder = FigureBuilder::new(client)
        .base_url(args.source.base_url)
        .policy(policy);

    let outcomes = builder.fetch_tables(&args.source.countries);
    if let Some(dir) = args.tables_dir.as_ref() {
        let loaded: Vec<_> = outcomes
            .iter()
            .filter_map(|o| o.table.as_ref().ok().map(|t| (o.indicator, t)))
            .collect();
        match storage::save_tables(dir, &loaded) {
            Ok(paths) => {
                for path in paths {
                    eprintln!("Saved table to {}", path.display());
                }
            }
            Err(e) => log::warn!("tables not saved: {:#}", e),
        }
    }
    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| o.table.is_err())
        .map(|o| o.indicator.code())
        .collect();
    if !failed.is_empty() {
        eprintln!("Could not load data for: {}", failed.join(", "));
    }

    let tables: Vec<_> = outcomes.iter().map(|o| o.table.as_ref().ok()).collect();
    emit(&assemble(&tables), args.out.as_deref(), args.pretty)
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    if !args.tables_dir.is_dir() {
        bail!("not a directory: {}", args.tables_dir.display());
    }
    let mut tables = Vec::with_capacity(Indicator::ALL.len());
    for ind in Indicator::ALL {
        let path = storage::table_path(&args.tables_dir, ind);
        if path.exists() {
            tables.push(Some(storage::load_table_csv(&path)?));
        } else {
            eprintln!("No table for {} at {}", ind, path.display());
            tables.push(None);
        }
    }
    let refs: Vec<_> = tables.iter().map(Option::as_ref).collect();
    emit(&assemble(&refs), args.out.as_deref(), args.pretty)
}

fn emit(figures: &[Figure], out: Option<&Path>, pretty: bool) -> Result<()> {
    match out {
        Some(path) => {
            storage::save_figures_json(figures, path)?;
            eprintln!("Wrote {} figures to {}", figures.len(), path.display());
        }
        None if pretty => println!("{}", serde_json::to_string_pretty(figures)?),
        None => println!("{}", serde_json::to_string(figures)?),
    }
    Ok(())
}
