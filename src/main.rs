use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use pokerlog::web;
use pokerlog::{Analyzer, AnalyzerConfig, OutputFormat, ParserConfig, TableKind};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pokerlog",
    version,
    about = "Hand-history parser and player statistics",
    author,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Hand-history files or directories of .txt files
    paths: Vec<PathBuf>,

    /// Currency symbol printed before amounts
    #[arg(short, long, env = "POKERLOG_CURRENCY", default_value = "$")]
    currency: String,

    /// Seated name of the player being analyzed
    #[arg(long, env = "POKERLOG_HERO", default_value = "Hero")]
    hero: String,

    /// Table to print
    #[arg(long, default_value = "players")]
    table: TableArg,

    /// Output format
    #[arg(long, default_value = "text")]
    format: FormatArg,

    /// Disable ANSI colors in CLI output
    #[arg(long = "no-color", default_value_t = false)]
    no_color: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the JSON service
    Serve {
        /// Address to bind (HOST:PORT)
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,
    },
}

#[derive(Debug, Clone, ValueEnum)]
enum TableArg {
    Players,
    Hands,
    Actions,
    Ledger,
    Summary,
}

impl From<TableArg> for TableKind {
    fn from(arg: TableArg) -> Self {
        match arg {
            TableArg::Players => TableKind::Players,
            TableArg::Hands => TableKind::Hands,
            TableArg::Actions => TableKind::Actions,
            TableArg::Ledger => TableKind::Ledger,
            TableArg::Summary => TableKind::Summary,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum FormatArg {
    Text,
    Json,
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = color_eyre::install();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pokerlog=info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let mut cli = Cli::parse();

    match cli.command.take() {
        Some(Commands::Serve { addr }) => run_server(addr).await?,
        None => run_cli(cli)?,
    }

    Ok(())
}

fn run_cli(cli: Cli) -> Result<()> {
    let config = AnalyzerConfig {
        parser: ParserConfig::new(cli.currency, cli.hero),
        table: cli.table.into(),
        format: cli.format.into(),
        no_color: cli.no_color,
    };
    let analyzer = Analyzer::new(config)?;
    analyzer.run(&cli.paths)
}

async fn run_server(addr: String) -> Result<()> {
    let addr: SocketAddr = addr.parse()?;
    web::serve(addr).await
}
