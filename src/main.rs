use std::sync::Arc;
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{info, warn};
use rephrase_gateway::chat::ChatSession;
use rephrase_gateway::config::GatewayConfig;
use rephrase_gateway::providers::{CompletionBackend, GroqClient};
use rephrase_gateway::server::{self, AppState};
use rephrase_gateway::{Error, Orchestrator, TemplateRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode
{   Server
  , Chat
}

#[derive(Debug, Parser)]
#[command(
  name = "rephrase-gateway"
, version
, about = "Groq-backed rephrasing and content generation"
)]
struct Cli
{   /// Run mode
    #[arg(long, value_enum, default_value_t = Mode::Server)]
    mode: Mode
  , /// Bind address; overrides HOST
    #[arg(long)]
    host: Option<String>
  , /// Bind port; overrides PORT
    #[arg(long)]
    port: Option<u16>
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>>
{   dotenvy::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
      .init();

    let cli = Cli::parse();
    let mut config = GatewayConfig::from_env()?;
    if let Some(host) = cli.host
    {   config.server.host = host;
    }
    if let Some(port) = cli.port
    {   config.server.port = port;
    }

    let registry = Arc::new(TemplateRegistry::builtin());
    let backend: Option<Arc<dyn CompletionBackend>> = if config.has_credential()
    {   let client = GroqClient::new(&config.provider)?;
        info!("Groq client initialized successfully");
        Some(Arc::new(client))
    } else
    {   None
    };

    match cli.mode
    {   Mode::Server => serve(config, registry, backend).await
      , Mode::Chat => {
          let backend = backend
            .ok_or_else(|| Error::MissingApiKey("Groq".to_string()))?;
          let orchestrator = Orchestrator::new(registry, backend.clone());
          ChatSession::new(orchestrator, backend).run().await?;
          Ok(())
        }
    }
}

async fn serve(
  config: GatewayConfig
, registry: Arc<TemplateRegistry>
, backend: Option<Arc<dyn CompletionBackend>>
) -> Result<(), Box<dyn std::error::Error>>
{   if backend.is_none()
    {   warn!("Starting without a Groq client; set GROQ_API_KEY to enable transformations");
    }
    let state = AppState::new(registry, backend);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    println!("Starting Groq AI Rephrase & Content Generation API server...");
    println!("API available at http://{}", addr);
    println!("Endpoints:");
    println!("  GET  /health");
    println!("  POST /rephrase");
    println!("  POST /rephrase/batch");
    println!("  POST /generate-content");
    println!("  POST /generate-content/batch");
    println!("  GET  /styles");
    println!("  GET  /content-types");
    println!("  GET  /tones");
    println!("  GET  /lengths");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, server::router(state)).await?;
    Ok(())
}
