//! Robin Server — application entry point.

mod config;

use anyhow::Context;
use clap::Parser;
use robin_auth::AuthService;
use robin_auth::service::LoginInput;
use robin_db::repository::RedisUserStore;
use robin_db::{DbConfig, DbManager};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Args, Command, Config, LogFormat, VerifyAs};

/// Used when `RUST_LOG` is unset: one directive per workspace crate.
const DEFAULT_LOG_FILTER: &str = "robin_auth=info,robin_db=info,robin_server=info";

fn init_logging(format: LogFormat) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(DEFAULT_LOG_FILTER),
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("install tracing subscriber: {e}"))
}

async fn connect(db: &DbConfig) -> anyhow::Result<RedisUserStore> {
    let manager = DbManager::connect(db)
        .await
        .context("connect to user store")?;
    Ok(RedisUserStore::new(&manager, db))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args)?;

    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    init_logging(config.log_format)?;
    info!("Starting Robin auth service...");

    let store = connect(&config.db).await?;
    let service = AuthService::new(store, config.auth.clone())?;

    // Privileged operations stay unavailable until this succeeds, but
    // the rest of the service can still start.
    if let Err(e) = service.ensure_admin_exists().await {
        error!(error = %e, "admin bootstrap failed; admin-gated operations will be rejected");
    }

    match args.command {
        None | Some(Command::Bootstrap) => {}
        Some(Command::Login { username, password }) => {
            let output = service.login(LoginInput { username, password }).await?;
            println!("{}", output.token);
        }
        Some(Command::Verify { token, check }) => {
            let verifier = service.verifier();
            let verdict = match check {
                VerifyAs::Session => verifier.verify_session(&token),
                VerifyAs::Admin => verifier.verify_admin(&token),
                VerifyAs::Reauth => verifier.verify_reauth(&token),
            };
            println!("{verdict}");
        }
        Some(Command::Claims { token }) => match service.verifier().claims_of(&token) {
            Some(claims) => println!("{}", serde_json::to_string_pretty(&claims)?),
            None => anyhow::bail!("token could not be decoded"),
        },
    }

    info!("Robin auth service stopped.");
    Ok(())
}
