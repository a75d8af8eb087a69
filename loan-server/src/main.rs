use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use loan_core::report::{JsonRenderer, ReportData, ReportRenderer, TextRenderer};
use loan_server::{app, export, load_config, logging};
use tracing::{debug, info};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Business loan project reports: HTTP API, preview and export.
#[derive(Debug, Parser)]
#[command(name = "loan-server")]
struct Cli {
    /// TOML configuration file. Defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "loan-server.toml")]
    config: PathBuf,

    /// Database connection string, overriding `[database]`.
    /// For SQLite this is a file path (e.g. `reports.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (the default).
    Serve {
        /// Address to bind, overriding `[server]`.
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on, overriding `[server]`.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the sample report.
    Preview {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Write stored report summaries as CSV.
    Export {
        /// Output file; stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;
    if let Some(db) = cli.db {
        config.database.connection_string = db;
    }
    logging::apply_config(&config.logging)?;
    debug!(config = %cli.config.display(), "configuration loaded");

    match cli.command.unwrap_or(Command::Serve {
        bind: None,
        port: None,
    }) {
        Command::Serve { bind, port } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;
            app::serve(&config).await
        }
        Command::Preview { format } => {
            // stdout carries the document
            logging::set_stdout_enabled(false)?;
            let renderer: &dyn ReportRenderer = match format {
                Format::Text => &TextRenderer,
                Format::Json => &JsonRenderer,
            };
            let document = renderer.render(&ReportData::preview())?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
        Command::Export { output } => {
            if output.is_none() {
                logging::set_stdout_enabled(false)?;
            }
            let repo = app::open_repository(&config.database).await?;
            let summaries = repo.list_summaries().await?;
            let count = match &output {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("cannot create {}", path.display()))?;
                    export::write_summaries(file, &summaries)?
                }
                None => export::write_summaries(io::stdout().lock(), &summaries)?,
            };
            info!(count, "reports exported");
            Ok(())
        }
    }
}
