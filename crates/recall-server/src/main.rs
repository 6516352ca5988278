//! recall server binary.
//!
//! Reads `recall.toml` (or the path given with `--config`) plus `RECALL__*`
//! environment overrides, opens the SQLite backlog and either serves HTTP or
//! runs a single ingestion pass.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use recall_core::{AuthToken, Ingestor};
use recall_remote::LeetCodeSource;
use recall_server::{
  AppState, ServerConfig, notifier::ConfiguredNotifier, scheduler::spawn_periodic_ingest,
};
use recall_store_sqlite::{SqliteBacklog, SqliteConnector};
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Revision scheduler for practice questions")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "recall.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Default)]
enum Command {
  /// Serve the HTTP API (the default).
  #[default]
  Serve,
  /// Run one ingestion pass and exit.
  Ingest,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  let backlog = Arc::new(open_backlog(&cfg).await?);
  let source = build_source(&cfg)?.map(Arc::new);

  let outcome = match cli.command.unwrap_or_default() {
    Command::Serve => serve(&cfg, Arc::clone(&backlog), source).await,
    Command::Ingest => ingest_once(Arc::clone(&backlog), source).await,
  };

  backlog.shutdown().await;
  outcome
}

async fn serve(
  cfg: &ServerConfig,
  backlog: Arc<SqliteBacklog>,
  source: Option<Arc<LeetCodeSource>>,
) -> anyhow::Result<()> {
  let notifier = ConfiguredNotifier::from_config(cfg.email.as_ref())
    .context("failed to build notifier")?;
  if cfg.secret_token.is_empty() {
    warn!("secret_token is empty; every token-checked route will answer 401");
  }

  let state = AppState::new(
    backlog,
    Arc::new(notifier),
    source,
    AuthToken::new(&cfg.secret_token),
    cfg.batch_size,
  );

  let ingest_task = match (&state.source, cfg.ingest.interval()) {
    (Some(source), Some(every)) => Some(spawn_periodic_ingest(
      state.ingestor.clone(),
      Arc::clone(source),
      every,
    )),
    _ => None,
  };

  let app = recall_server::router(state);
  let address = format!("{}:{}", cfg.host, cfg.port);

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  let served = axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error");

  if let Some(task) = ingest_task {
    task.abort();
  }
  served
}

async fn ingest_once(
  backlog: Arc<SqliteBacklog>,
  source: Option<Arc<LeetCodeSource>>,
) -> anyhow::Result<()> {
  let source = source.context("ingest.username is not configured")?;
  let inserted = Ingestor::new(backlog)
    .pull(source.as_ref())
    .await
    .context("ingestion failed")?;

  for url in &inserted {
    println!("{url}");
  }
  info!(inserted = inserted.len(), "ingestion finished");
  Ok(())
}

async fn open_backlog(cfg: &ServerConfig) -> anyhow::Result<SqliteBacklog> {
  let store_path = expand_tilde(&cfg.store_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let connector = SqliteConnector::file(&store_path).with_busy_timeout(cfg.pool.busy_timeout());
  SqliteBacklog::with_connector(connector, cfg.pool.pool_config())
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))
}

fn build_source(cfg: &ServerConfig) -> anyhow::Result<Option<LeetCodeSource>> {
  let Some(username) = &cfg.ingest.username else {
    return Ok(None);
  };
  let source = LeetCodeSource::new(username.clone())
    .context("failed to build LeetCode client")?
    .with_endpoint(cfg.ingest.endpoint.clone())
    .with_limit(cfg.ingest.limit);
  Ok(Some(source))
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!("shutting down");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
