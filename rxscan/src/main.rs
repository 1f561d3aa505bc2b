use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rxscan::api::{create_router, AppState, UploadResponse};
use rxscan::config::Config;
use rxscan::ocr::{OcrProvider, TextRecognizer};
use rxscan::pipeline::PrescriptionPipeline;
use rxscan::upload::ImageUpload;

#[derive(Parser)]
#[command(name = "rxscan")]
#[command(about = "Prescription image scanner")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Scan one prescription image and print the medicines as JSON
    Scan {
        image: PathBuf,
    },
    /// Run tesseract directly on a known test image
    CheckOcr {
        image: PathBuf,
        /// Text the recognized output must contain
        #[arg(long, default_value = "500mg")]
        expect: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rxscan=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Scan { image } => scan(config, &image).await,
        Command::CheckOcr { image, expect } => check_ocr(config, &image, &expect).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.upload.upload_dir).with_context(|| {
        format!(
            "failed to create upload directory {}",
            config.upload.upload_dir.display()
        )
    })?;

    tracing::info!("Initializing OCR provider: {}...", config.ocr.languages);
    let ocr = OcrProvider::new(&config.ocr);
    if !ocr.is_available() {
        tracing::warn!("OCR unavailable - uploads will fail until tesseract is installed");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, Arc::new(ocr));
    let app = create_router(state);

    tracing::info!("rxscan starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  API docs:     http://{}/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/openapi.json", addr);

    let cancel_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel_token.clone()));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(cancel_token.cancelled_owned())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn scan(config: Config, image: &Path) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("failed to read {}", image.display()))?;
    let file_name = image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let upload = ImageUpload::new(file_name, bytes).validate()?;

    let ocr = OcrProvider::new(&config.ocr);
    let pipeline = PrescriptionPipeline::new(Arc::new(ocr), &config);
    let outcome = pipeline.scan(upload.bytes).await?;

    println!("{}", serde_json::to_string_pretty(&UploadResponse::from(outcome))?);
    Ok(())
}

async fn check_ocr(config: Config, image: &Path, expect: &str) -> anyhow::Result<()> {
    let ocr = OcrProvider::new(&config.ocr);
    if !ocr.is_available() {
        anyhow::bail!("Tesseract is not available for languages '{}'", ocr.languages());
    }

    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("failed to read {}", image.display()))?;
    let text = ocr.ocr(&bytes).await?;
    println!("Extracted text:\n{text}");

    if !text.contains(expect) {
        anyhow::bail!("OCR output does not contain '{expect}'");
    }

    println!("Tesseract is working properly");
    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
    cancel_token.cancel();
}
