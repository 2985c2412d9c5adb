use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use server::{AppState, ServerConfig, start_server};
use services::{ApiClient, ApiConfig, AppServices, Clock, MetricsConfig, StudyClient};
use study_core::model::{StudySetId, TermId, UserId};
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ui::{App, UiApp, build_app_context};

mod config;
mod db;

use config::{AppEnv, Cli, Command, CommonArgs, ServeArgs, UiArgs};
use db::{normalize_sqlite_url, prepare_sqlite_file};

struct DesktopApp {
    client: StudyClient,
    default_study_set: Option<StudySetId>,
}

impl UiApp for DesktopApp {
    fn app_name(&self) -> &str {
        "Study"
    }

    fn study_client(&self) -> StudyClient {
        self.client.clone()
    }

    fn default_study_set(&self) -> Option<StudySetId> {
        self.default_study_set
    }

    fn request_edit(&self, study_set_id: StudySetId, term_id: TermId) {
        tracing::info!(
            study_set = %study_set_id,
            term = %term_id,
            "edit requested; editing happens in the web app"
        );
    }
}

fn init_tracing(common: &CommonArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", common.log_level)));
    let registry = tracing_subscriber::registry().with(filter);
    match common.app_env {
        AppEnv::Production => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        AppEnv::Development => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn open_services(common: &CommonArgs, metrics: &MetricsConfig) -> anyhow::Result<AppServices> {
    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    let db_url = normalize_sqlite_url(common.database_url.clone());
    prepare_sqlite_file(&db_url)?;
    AppServices::new_sqlite(&db_url, Clock::default(), metrics)
        .await
        .with_context(|| format!("opening {db_url}"))
}

async fn serve(common: &CommonArgs, args: &ServeArgs) -> anyhow::Result<()> {
    let metrics = MetricsConfig::new(args.server_name.as_str(), args.version())
        .with_query_timeout(args.query_timeout());
    let services = open_services(common, &metrics).await?;

    tracing::info!(
        server = %args.server_name,
        env = ?common.app_env,
        "starting API"
    );
    let config = ServerConfig {
        listen: args.listen,
    };
    start_server(&config, Arc::new(AppState::new(services))).await?;
    Ok(())
}

async fn launch_ui(common: &CommonArgs, args: &UiArgs) -> anyhow::Result<()> {
    let user_id = args.user_id.map(UserId::new);
    let runtime = Handle::current();

    let client = match args.api_url.clone() {
        Some(base_url) => {
            tracing::info!(api = %base_url, "using remote API");
            StudyClient::remote(ApiClient::new(ApiConfig { base_url, user_id }), runtime)
        }
        None => {
            let metrics = MetricsConfig::new("desktop", env!("CARGO_PKG_VERSION"));
            open_services(common, &metrics)
                .await?
                .study_client(user_id, runtime)
        }
    }
    .with_shuffle(args.shuffle);

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        client,
        default_study_set: args.study_set_id.map(StudySetId::new),
    });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Study")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(&cli.common);

    match &cli.command {
        Command::Serve(args) => serve(&cli.common, args).await,
        Command::Ui(args) => launch_ui(&cli.common, args).await,
    }
}
