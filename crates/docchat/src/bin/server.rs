//! docchat server binary
//!
//! Run with: cargo run -p docchat --bin docchat-server -- --config docchat.toml

use clap::Parser;
use docchat::{config::RagConfig, server::RagServer};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "docchat-server", version, about = "Chat with your PDFs over HTTP")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "DOCCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may carry GROQ_KEY and DOCCHAT_* settings
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docchat=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                         docchat                           ║
║        Conversational Q&A over your PDF documents         ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration
    let mut config = RagConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embeddings: {:?} / {}", config.embeddings.provider, config.embeddings.model);
    tracing::info!("  - LLM: {:?} / {}", config.llm.provider, config.llm.generate_model);
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - Retrieval top_k: {}", config.retrieval.top_k);
    tracing::info!("  - Speech: {:?}", config.speech.provider);

    let server = RagServer::new(config)?;

    // Model backends may come up after us, so report not-ready instead of exiting
    let healthy = server.state().rag().providers_healthy().await;
    server.state().set_ready(healthy);
    if healthy {
        tracing::info!("Model providers are reachable");
    } else {
        tracing::warn!("Model providers did not answer their health checks");
        tracing::warn!("/ready returns 503 and queries will fail until the backends are up");
        let state = server.state().clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(10));
            loop {
                interval.tick().await;
                if state.rag().providers_healthy().await {
                    state.set_ready(true);
                    tracing::info!("Model providers are reachable, server is ready");
                    break;
                }
            }
        });
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  Info: http://{}/info", server.address());
    println!("\nEndpoints:");
    println!("  POST   /upload_pdf            - Upload PDFs, get a session id");
    println!("  POST   /query                 - Ask a question in a session");
    println!("  GET    /sessions/:id/history  - Conversation history");
    println!("  DELETE /sessions/:id          - Delete a session");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
