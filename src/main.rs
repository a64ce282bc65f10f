use std::path::PathBuf;

use aspen_lite::config::Config;
use aspen_lite::db::{DirectoryStorage, OpenMode, sqlite_file};
use aspen_lite::router::{AspenState, aspen_router};
use aspen_lite::service::record_loader;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "aspen-lite", version, about = "Student directory lookup service")]
struct Cli {
    /// Overrides `basic.database_url` (e.g. `sqlite:data/aspen.db`)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the REST API (default)
    Serve,
    /// Create the database file and schema
    Init,
    /// Import a JSON array of student records (file or directory of *.json)
    Import { file: PathBuf },
    /// Print counts, top schools and indexes
    Verify,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut cfg = Config::load()?;
    if let Some(url) = cli.database_url {
        cfg.basic.database_url = url;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&cfg).await?,
        Command::Init => {
            let storage = open(&cfg, OpenMode::Create).await?;
            storage.init_schema().await?;
            info!(database_url = %cfg.basic.database_url, "schema initialized");
        }
        Command::Import { file } => {
            let records = record_loader::load_records(&file)?;
            let storage = open(&cfg, OpenMode::ReadWrite).await?;
            let summary = storage.import_records(&records).await?;
            info!(
                schools = summary.schools,
                students = summary.students,
                elapsed_secs = summary.elapsed.as_secs_f64(),
                rate = summary.rate(),
                "import complete"
            );
        }
        Command::Verify => {
            let storage = open(&cfg, OpenMode::ReadWrite).await?;
            let report = storage.verify().await?;
            info!(
                schools = report.school_count,
                students = report.student_count,
                last_import_at = ?report.last_import_at,
                "database contents"
            );
            for (name, count) in &report.top_schools {
                info!(school = %name, students = count, "top school");
            }
            for (query, elapsed, rows) in &report.query_timings {
                let ms = elapsed.as_secs_f64() * 1000.0;
                info!(query = %query, elapsed_ms = ms, rows, "query timing");
            }
            info!(count = report.indexes.len(), indexes = ?report.indexes, "indexes");
            if let Some(path) = sqlite_file(&cfg.basic.database_url) {
                match std::fs::metadata(&path) {
                    Ok(meta) => {
                        let mb = meta.len() as f64 / (1024.0 * 1024.0);
                        info!(path = %path.display(), size_mb = mb, "database file");
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "cannot stat database file")
                    }
                }
            }
        }
    }
    Ok(())
}

async fn serve(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        database_url = %cfg.basic.database_url,
        listen_addr = %cfg.basic.listen_addr,
        loglevel = %cfg.basic.loglevel
    );

    // Refuses to start when the database file is missing.
    let storage = open(cfg, OpenMode::ReadOnly).await?;
    let state = AspenState::new(storage, cfg.cache);
    let app = aspen_router(state);

    let listener = TcpListener::bind(&cfg.basic.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server shutdown complete");
    Ok(())
}

async fn open(cfg: &Config, mode: OpenMode) -> Result<DirectoryStorage, aspen_lite::AspenError> {
    DirectoryStorage::connect(&cfg.basic.database_url, mode, cfg.basic.max_connections).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
