//! simpleblob CLI - Command line interface for blob backends
//!
//! Stores, loads, lists and deletes blobs on the backend selected by the
//! config file or `--root`. Status output is JSON on stdout; logs go to
//! stderr (set `RUST_LOG=debug` for per-operation events).

use clap::{Parser, Subcommand};
use simpleblob::{BackendConfig, Config, Context, Interface};
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "simpleblob")]
#[command(about = "Store, load, list and delete blobs on any configured backend")]
#[command(version)]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the filesystem backend rooted at this directory
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Abort the command after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file for the selected backend and create its storage
    Init,

    /// List blobs, sorted by name
    List {
        /// Only list names starting with this prefix
        prefix: Option<String>,
    },

    /// Store a blob, replacing any existing content
    Put {
        /// The blob name
        name: String,
        /// Read content from this file instead of stdin
        #[arg(short = 'i', long)]
        file: Option<PathBuf>,
    },

    /// Write a blob's content to stdout or a file
    Get {
        /// The blob name
        name: String,
        /// Write content to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a blob (succeeds if it does not exist)
    Delete {
        /// The blob name
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let format = cli.format;

    if matches!(cli.command, Commands::Init) {
        return init(&cli, format);
    }

    let config = resolve_config(&cli)?;
    let backend = simpleblob::open(&config.backend)?;

    let mut ctx = Context::background();
    if let Some(timeout) = config.timeout() {
        ctx = ctx.with_timeout(timeout);
    }

    match cli.command {
        Commands::List { prefix } => {
            let list = backend.list(&ctx, prefix.as_deref().unwrap_or("")).await?;
            output(
                format,
                &serde_json::json!({
                    "count": list.len(),
                    "total_size": list.total_size(),
                    "blobs": list
                }),
            )?;
        }

        Commands::Put { name, file } => {
            let data = match file {
                Some(path) => tokio::fs::read(&path).await?,
                None => {
                    let mut buf = Vec::new();
                    tokio::io::stdin().read_to_end(&mut buf).await?;
                    buf
                }
            };
            backend.store(&ctx, &name, &data).await?;
            output(
                format,
                &serde_json::json!({
                    "status": "ok",
                    "name": name,
                    "size": data.len()
                }),
            )?;
        }

        Commands::Get { name, output: dest } => match backend.load(&ctx, &name).await {
            Ok(data) => match dest {
                Some(path) => {
                    tokio::fs::write(&path, &data).await?;
                    output(
                        format,
                        &serde_json::json!({
                            "status": "ok",
                            "name": name,
                            "size": data.len(),
                            "path": path.display().to_string()
                        }),
                    )?;
                }
                None => {
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&data).await?;
                    stdout.flush().await?;
                }
            },
            Err(e) if e.is_not_found() => {
                output(
                    format,
                    &serde_json::json!({
                        "status": "error",
                        "message": format!("Blob not found: {}", name)
                    }),
                )?;
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },

        Commands::Init => unreachable!("handled before opening the backend"),

        Commands::Delete { name } => {
            backend.delete(&ctx, &name).await?;
            output(
                format,
                &serde_json::json!({
                    "status": "ok",
                    "name": name
                }),
            )?;
        }
    }

    Ok(())
}

/// Pick the backend: `--root` wins, then the config file, then defaults
///
/// With `--root` and no `--config`, the default config file is not read.
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = if cli.root.is_some() && cli.config.is_none() {
        Config::default()
    } else {
        Config::resolve(cli.config.as_deref())?
    };
    apply_overrides(cli, &mut config);

    tracing::debug!(
        backend = config.backend.type_name(),
        timeout_secs = ?config.timeout_secs,
        "resolved config"
    );
    Ok(config)
}

fn apply_overrides(cli: &Cli, config: &mut Config) {
    if let Some(root) = &cli.root {
        config.backend = BackendConfig::Fs {
            root_path: root.clone(),
        };
    }
    if let Some(secs) = cli.timeout {
        config.timeout_secs = Some(secs);
    }
}

/// Save the defaults plus `--root`/`--timeout` to `--config` or the default path
fn init(cli: &Cli, format: OutputFormat) -> anyhow::Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()
            .ok_or_else(|| anyhow::anyhow!("No config directory found; pass --config"))?,
    };

    let mut config = Config::default();
    apply_overrides(cli, &mut config);
    config.save(&path)?;
    simpleblob::open(&config.backend)?;

    output(
        format,
        &serde_json::json!({
            "status": "ok",
            "path": path.display().to_string(),
            "backend": config.backend.type_name()
        }),
    )
}

fn output(format: OutputFormat, value: &serde_json::Value) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
