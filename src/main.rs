use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};

use repodiff::config::Config;
use repodiff::local::{DirLister, PacmanDatabase};
use repodiff::output;
use repodiff::reconcile::Reconciler;
use repodiff::remote::AurClient;

#[derive(Parser)]
#[command(name = "repodiff")]
#[command(version, about = "Reconcile a pacman repository with its database and the AUR")]
struct Cli {
    /// Config file [default: $XDG_CONFIG_HOME/repodiff/config.toml]
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show how the directory, database, and upstream differ
    Status(StatusArgs),
    /// Show version and effective configuration
    Version,
}

#[derive(Args)]
struct StatusArgs {
    /// Repository database; packages are read from its directory
    #[arg(short, long, value_name = "DB")]
    repo: Option<PathBuf>,

    /// Do not query upstream
    #[arg(long)]
    no_upstream: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Also list current packages
    #[arg(short, long)]
    all: bool,

    /// Maximum number of concurrent upstream lookups
    #[arg(short = 'j', long)]
    parallelism: Option<usize>,

    /// Timeout for each upstream lookup in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Leave a package out of pending and update checks (repeatable)
    #[arg(long = "ignore", value_name = "NAME")]
    ignore: Vec<String>,

    /// Only query upstream for these packages
    names: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = repodiff::logging::init(cli.log_file.as_deref())?;

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Status(args) => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(status(&mut config, args)),
        Command::Version => version(&config),
    }
}

async fn status(config: &mut Config, args: StatusArgs) -> anyhow::Result<()> {
    if args.repo.is_some() {
        config.repository = args.repo;
    }
    if args.no_upstream {
        config.upstream.enabled = false;
    }
    if let Some(parallelism) = args.parallelism {
        config.upstream.parallelism = parallelism;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.upstream.timeout_ms = timeout_ms;
    }
    config.ignore.extend(args.ignore);

    let Some(db_path) = config.repository.clone() else {
        bail!("no repository database given; use --repo or set `repository` in the config file");
    };
    let repo_dir = match db_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let reconciler = Reconciler::new(
        config.reconcile_config(),
        Arc::new(DirLister),
        Arc::new(PacmanDatabase),
        Arc::new(AurClient::new(&config.upstream.base_url)),
    );

    let names = (!args.names.is_empty()).then_some(args.names.as_slice());
    let report = reconciler
        .reconcile(&repo_dir, &db_path, names)
        .await
        .with_context(|| format!("cannot reconcile repository {}", db_path.display()))?;

    for line in report.warning_lines() {
        eprintln!("warning: {}", line);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", output::render(&report, args.all));
    }

    Ok(())
}

fn version(config: &Config) -> anyhow::Result<()> {
    println!(
        "{} version {}\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} configuration:",
        if config.configured { "Current" } else { "Default" }
    );
    let rendered = config
        .to_toml()
        .context("cannot render configuration as TOML")?;
    for line in rendered.lines() {
        println!("    {}", line);
    }
    Ok(())
}
