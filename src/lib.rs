pub mod api;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;

use anyhow::Context;
pub use config::Config;
use state::SharedState;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let mut log_level = config.general.log_level.clone();
    if config.general.suppress_connection_errors {
        log_level.push_str(",reqwest::retry=off,hyper_util=off");
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "ricettario")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    let args: Vec<String> = std::env::args().collect();

    if let Some(command) = args.get(1) {
        match command.as_str() {
            "serve" | "-s" | "--serve" => {}

            "init" | "--init" => {
                Config::create_default_if_missing()?;
                println!("✓ Config file created. Edit config.toml and run again.");
                return Ok(());
            }

            "help" | "-h" | "--help" => {
                print_help();
                return Ok(());
            }

            _ => {
                println!("Unknown command: {}", command);
                println!();
                print_help();
                return Ok(());
            }
        }
    }

    serve(config, prometheus_handle).await
}

fn print_help() {
    println!("Ricettario - Recipe Sharing Server");
    println!();
    println!("USAGE:");
    println!("  ricettario [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("  serve             Start the web server (default)");
    println!("  init              Create default config file");
    println!("  help              Show this help message");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml to configure the server, database and Google login.");
    println!("  GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET env vars override the file.");
}

async fn serve(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "Ricettario v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let port = config.server.port;

    let shared = Arc::new(SharedState::new(config).await?);
    let api_state = api::create_app_state(shared, prometheus_handle).await?;

    let app = api::router(api_state).await;
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Web Server running at http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server stopped");

    Ok(())
}
