//! Command line and environment configuration.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(name = "app")]
#[command(about = "Study sets: HTTP API and desktop learner")]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// SQLite database URL or path
    #[arg(long = "db", env = "DATABASE_URL", default_value = "sqlite://dev.sqlite3", global = true)]
    pub database_url: String,

    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    /// Deployment mode; production switches logs to JSON
    #[arg(long, env = "APP_ENV", value_enum, default_value_t = AppEnv::Development, global = true)]
    pub app_env: AppEnv,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP API and metrics endpoint
    Serve(ServeArgs),
    /// Open the desktop learner
    Ui(UiArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Value of the `server` label on every metric
    #[arg(long, env = "SERVER_NAME", default_value = "local")]
    pub server_name: String,

    /// Timeout for each metrics aggregate query, in milliseconds
    #[arg(long, env = "METRICS_QUERY_TIMEOUT_MS", default_value_t = 2000)]
    pub metrics_query_timeout_ms: u64,

    /// Version reported by `version_info`; defaults to the build version
    #[arg(long, env = "APP_VERSION")]
    pub app_version: Option<String>,
}

impl ServeArgs {
    #[must_use]
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.metrics_query_timeout_ms)
    }

    #[must_use]
    pub fn version(&self) -> String {
        self.app_version
            .clone()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string())
    }
}

#[derive(Args, Debug, Clone)]
pub struct UiArgs {
    /// Signed-in user; progress is not saved without one
    #[arg(long, env = "USER_ID")]
    pub user_id: Option<u64>,

    /// Study set offered on the home page
    #[arg(long, env = "STUDY_SET_ID")]
    pub study_set_id: Option<u64>,

    /// Talk to a running API instead of the local database
    #[arg(long, env = "API_URL")]
    pub api_url: Option<String>,

    /// Shuffle terms at the start of a session
    #[arg(long)]
    pub shuffle: bool,
}
