//! Server configuration.
//!
//! Values are read from an optional TOML file and then from
//! `ROBIN_`-prefixed environment variables, nested keys separated by
//! `__`:
//!
//! ```bash
//! ROBIN_AUTH__JWT_SECRET="..."          # required, identical on every service
//! ROBIN_AUTH__SESSION_TOKEN_LIFETIME_SECS=3600
//! ROBIN_DB__URL="redis://cache:6379/0"
//! ROBIN_LOG_FORMAT=pretty
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use robin_auth::AuthConfig;
use robin_db::DbConfig;
use serde::Deserialize;

/// Robin auth service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "ROBIN_CONFIG", default_value = "robin.toml")]
    pub config: PathBuf,

    /// Validate configuration and exit.
    #[arg(long)]
    pub validate: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ensure the admin user exists, then exit.
    Bootstrap,
    /// Check a username and password and print a session token.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "ROBIN_LOGIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Verify a token and print the verdict.
    Verify {
        token: String,
        #[arg(long = "as", value_enum, default_value_t = VerifyAs::Session)]
        check: VerifyAs,
    },
    /// Print the claims of a correctly signed, unexpired token as JSON.
    Claims { token: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyAs {
    Session,
    Admin,
    Reauth,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub auth: AuthConfig,
    pub db: DbConfig,
    pub log_format: LogFormat,
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config
            .auth
            .validate()
            .map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Toml::file(&args.config))
            .merge(Env::prefixed("ROBIN_").split("__").ignore(&["config", "login_password"]))
    }
}
