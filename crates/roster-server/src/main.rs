//! Roster admin server binary.
//!
//! Settings come from a TOML file layered under `ROSTER_*` environment
//! variables (`ROSTER_PORT=9000`, `ROSTER_EDIT_POLICY=atomic`, ...). Accounts
//! live only in the file, each with an argon2 PHC string that
//! `server --hash-password` produces.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use roster_server::{AppState, ServerConfig};
use roster_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Roster student records server")]
struct Cli {
  /// Settings file; missing is fine when everything comes from `ROSTER_*`.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Hash a password typed on stdin for an `[[accounts]]` entry, then exit.
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
    return print_password_hash();
  }

  let server_cfg = load_config(cli.config)?;
  if server_cfg.accounts.is_empty() {
    tracing::warn!("no accounts configured; only public routes will be usable");
  }

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open roster database at {store_path:?}"))?;

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!(
    policy   = ?server_cfg.edit_policy,
    accounts = server_cfg.accounts.len(),
    "roster database ready at {store_path:?}",
  );

  let app = roster_server::router(AppState {
    store:  Arc::new(store),
    config: Arc::new(server_cfg),
  });

  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("roster listening on http://{address}");

  axum::serve(listener, app).await.context("server error")
}

fn load_config(path: PathBuf) -> anyhow::Result<ServerConfig> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("ROSTER"))
    .build()
    .context("failed to read roster settings")?
    .try_deserialize()
    .context("invalid roster settings")
}

fn print_password_hash() -> anyhow::Result<()> {
  use std::io::{self, BufRead, Write};

  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\n', '\r']);

  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
  println!("{hash}");
  Ok(())
}

/// `~/roster.db` becomes `$HOME/roster.db`; other paths pass through.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
