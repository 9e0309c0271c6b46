//! wdsp-cl - Waste disposal classifier microservice
//!
//! **Module Identity:**
//! - Name: wdsp-cl (Classifier)
//! - Default address: 127.0.0.1:5000
//!
//! Loads the classifier model once at startup and serves `POST /classify`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wdsp_cl::config::{Config, Overrides};
use wdsp_cl::disposal::{KnowledgeBase, LabelResolver};
use wdsp_cl::pipeline::ClassificationPipeline;
use wdsp_cl::vision::{ImageNormalizer, TractClassifier};
use wdsp_cl::{build_router, AppState};

/// Command-line arguments for wdsp-cl
#[derive(Parser, Debug)]
#[command(name = "wdsp-cl")]
#[command(about = "Waste disposal image classifier service")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "WDSP_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on (host:port)
    #[arg(long, env = "WDSP_BIND_ADDR")]
    bind_addr: Option<String>,

    /// ONNX classification model
    #[arg(long, env = "WDSP_MODEL_PATH")]
    model_path: Option<PathBuf>,

    /// Label vocabulary (.json class index or one label per line)
    #[arg(long, env = "WDSP_LABELS_PATH")]
    labels_path: Option<PathBuf>,

    /// Number of ranked predictions considered per image
    #[arg(long, env = "WDSP_TOP_K")]
    top_k: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = Overrides {
        bind_addr: args.bind_addr,
        model_path: args.model_path,
        labels_path: args.labels_path,
        top_k: args.top_k,
    };
    let config = Config::load(args.config.as_deref(), overrides)
        .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    let level = config.logging.level.to_lowercase();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("wdsp_cl={level},wdsp_common={level},tower_http={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting WDSP Classifier (wdsp-cl) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Model: {}", config.model_path.display());
    info!("Labels: {}", config.labels_path.display());
    if !config.label_map.is_empty() {
        info!("{} extra label mappings from config file", config.label_map.len());
    }

    let classifier = TractClassifier::load(&config.model_path, &config.labels_path, &config.input)
        .context("Failed to load classifier")?;

    let resolver = LabelResolver::builtin().with_mappings(config.label_map.clone());
    let pipeline = ClassificationPipeline::new(
        ImageNormalizer::new(config.input),
        Arc::new(classifier),
        resolver,
        KnowledgeBase::builtin(),
        config.top_k,
    )
    .context("Failed to build classification pipeline")?;

    let state = AppState::new(pipeline, config.max_upload_bytes);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!("wdsp-cl listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
