//! Document Q&A server binary
//!
//! Run with: cargo run --bin docqa-server [config.toml]

use std::path::PathBuf;

use docqa::config::AppConfig;
use docqa::providers::{EmbeddingProvider, GeminiClient};
use docqa::server::QaServer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docqa=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                     Document Q&A Server                   ║
║        Upload documents, ask grounded questions           ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration (optional TOML path as the first argument)
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - Generation model: {}", config.llm.generate_model);
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);
    tracing::info!("  - Top-k: {}", config.retrieval.top_k);
    tracing::info!("  - Data dir: {}", config.storage.data_dir.display());

    if config.llm.api_key.is_empty() {
        tracing::warn!("No API key configured; set GEMINI_API_KEY before uploading or asking");
    } else {
        // Probe the upstream service so a bad key shows up at startup
        let probe = GeminiClient::new(&config.llm);
        match EmbeddingProvider::health_check(&probe).await {
            Ok(true) => tracing::info!("Generative Language API reachable"),
            _ => tracing::warn!(
                "Generative Language API not reachable at {}",
                config.llm.base_url
            ),
        }
    }

    // Create and start server
    let server = QaServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/register  - Create an account");
    println!("  POST /api/upload    - Upload a document");
    println!("  POST /api/qa        - Ask a question");
    println!("  GET  /api/history   - Chat history");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
