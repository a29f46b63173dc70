//! crimefiles server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, optionally imports a case file, and serves the interrogation API
//! over HTTP until interrupted.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `admin_password_hash`:
//!
//! ```text
//! cargo run -p crimefiles-server -- --hash-password
//! ```

mod settings;

use std::{fs, path::PathBuf, sync::Arc};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use crimefiles_api::{AppState, AuthConfig, api_router};
use crimefiles_core::case::CaseFile;
use crimefiles_dialogue::Interrogator;
use crimefiles_llm::Provider;
use crimefiles_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Crimefiles interrogation server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Import (or replace) a case from a JSON case file before serving.
  #[arg(long, value_name = "FILE")]
  seed: Option<PathBuf>,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
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

  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let server_cfg = settings::load(&cli.config)?;
  let store_path = settings::expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if let Some(seed) = &cli.seed {
    let raw = fs::read_to_string(seed)
      .with_context(|| format!("failed to read case file {seed:?}"))?;
    let file: CaseFile = serde_json::from_str(&raw)
      .with_context(|| format!("failed to parse case file {seed:?}"))?;
    let case_id = file.case.case_id.clone();
    let suspects = file.suspects.len();
    store
      .import_case(file)
      .await
      .with_context(|| format!("failed to import case {case_id}"))?;
    tracing::info!(%case_id, suspects, "imported case");
  }

  let provider = Provider::from_config(&server_cfg.llm)
    .context("failed to configure the language model")?;
  tracing::info!(provider = ?provider.kind(), model = %server_cfg.llm.model, "generator ready");

  if server_cfg.admin_username.is_empty() {
    tracing::warn!("admin_username is not set; admin routes will reject every request");
  }

  let state = AppState {
    interrogator: Arc::new(Interrogator::new(
      store.clone(),
      provider,
      server_cfg.dialogue_settings(),
    )),
    auth:         Arc::new(AuthConfig {
      username:      server_cfg.admin_username.clone(),
      password_hash: server_cfg.admin_password_hash.clone(),
    }),
  };

  let app = api_router(state).layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("shutting down");
  store.close().await.context("failed to close store")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
