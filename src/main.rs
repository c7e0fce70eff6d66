// src/main.rs
// Workbench - local API server for multi-provider AI chat

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use workbench::client::{ChatClient, ChatStore, SessionFile, default_sessions_path};
use workbench::config::ServerConfig;
use workbench::llm::{ApiKeyResolver, PROVIDERS, ProviderId};
use workbench::state::AppState;
use workbench::store::EnvFileStore;

#[derive(Parser)]
#[command(name = "workbench")]
#[command(about = "Local API server for an AI workbench")]
#[command(version)]
struct Cli {
    /// Log filter, e.g. `info` or `workbench=debug,tower_http=info`
    #[arg(long, global = true, env = "WORKBENCH_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server (default)
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Chat with a running server from the terminal
    Chat {
        /// Provider id (openai, anthropic, openrouter, google, mistral, cohere)
        #[arg(short = 'P', long, default_value = "openai")]
        provider: String,

        /// Model override; the provider default otherwise
        #[arg(short, long)]
        model: Option<String>,

        /// Continue an existing session
        #[arg(short, long)]
        session: Option<Uuid>,

        /// Server origin
        #[arg(long, env = "WORKBENCH_URL", default_value = "http://127.0.0.1:3001")]
        server: String,

        /// Session file (defaults to the user data directory)
        #[arg(long)]
        sessions_file: Option<PathBuf>,

        /// Send one message and exit; interactive when omitted
        message: Vec<String>,
    },

    /// Manage saved chat sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,

        #[arg(long, global = true)]
        sessions_file: Option<PathBuf>,
    },

    /// List providers and whether a key is configured
    Providers,
}

#[derive(Subcommand)]
enum SessionAction {
    /// List sessions
    List,
    /// Delete a session
    Delete { id: Uuid },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => run_server(host, port).await,
        Commands::Chat {
            provider,
            model,
            session,
            server,
            sessions_file,
            message,
        } => run_chat(provider, model, session, server, sessions_file, message).await,
        Commands::Sessions {
            action,
            sessions_file,
        } => run_sessions(action, sessions_file).await,
        Commands::Providers => list_providers().await,
    }
}

async fn run_server(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = ServerConfig::from_env();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    info!("Starting Workbench v{}", env!("CARGO_PKG_VERSION"));
    let state = AppState::new(config).context("Failed to initialise application state")?;
    workbench::api::run(state).await
}

async fn run_chat(
    provider: String,
    model: Option<String>,
    session: Option<Uuid>,
    server: String,
    sessions_file: Option<PathBuf>,
    message: Vec<String>,
) -> Result<()> {
    let provider = ProviderId::parse(&provider).ok_or_else(|| anyhow!("Unknown provider: {provider}"))?;
    let file = SessionFile::new(sessions_file.unwrap_or_else(default_sessions_path));
    let mut chats = file.load().await?;
    let client = ChatClient::new(server)?;

    let session_id = match session {
        Some(id) => {
            chats.set_current(id)?;
            id
        }
        None => chats.create_session(provider, model),
    };

    if !message.is_empty() {
        let text = message.join(" ");
        let result = send_one(&client, &mut chats, session_id, &text).await;
        file.save(&chats).await?;
        return result;
    }

    eprintln!("Session {session_id} ({provider}). Empty line or Ctrl-D to quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        std::io::stderr().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            break;
        }
        if let Err(e) = send_one(&client, &mut chats, session_id, text).await {
            eprintln!("error: {e:#}");
        }
        file.save(&chats).await?;
    }
    file.save(&chats).await?;
    Ok(())
}

async fn send_one(
    client: &ChatClient,
    chats: &mut ChatStore,
    session_id: Uuid,
    text: &str,
) -> Result<()> {
    // Non-streaming replies arrive as a single delta
    client
        .send(chats, session_id, text, |delta| {
            print!("{delta}");
            let _ = std::io::stdout().flush();
        })
        .await?;
    println!();
    Ok(())
}

async fn run_sessions(action: SessionAction, sessions_file: Option<PathBuf>) -> Result<()> {
    let file = SessionFile::new(sessions_file.unwrap_or_else(default_sessions_path));
    let mut chats = file.load().await?;

    match action {
        SessionAction::List => {
            let current = chats.current().map(|s| s.id);
            for session in chats.sessions() {
                let marker = if Some(session.id) == current { "*" } else { " " };
                println!(
                    "{marker} {}  {:<12} {:>3} msgs  {}  {}",
                    session.id,
                    session.provider.as_str(),
                    session.messages.len(),
                    session.updated_at.format("%Y-%m-%d %H:%M"),
                    session.title
                );
            }
        }
        SessionAction::Delete { id } => {
            let removed = chats.delete_session(id)?;
            file.save(&chats).await?;
            println!("Deleted {}", removed.title);
        }
    }
    Ok(())
}

async fn list_providers() -> Result<()> {
    let config = ServerConfig::from_env();
    let keys = ApiKeyResolver::new(
        Arc::new(EnvFileStore::new(&config.env_file)),
        config.process_env_keys,
    );

    for provider in PROVIDERS {
        let status = if keys.is_configured(provider).await {
            "configured"
        } else {
            "missing key"
        };
        println!(
            "{:<12} {:<18} {:<12} {}",
            provider.id.as_str(),
            provider.env_key,
            status,
            provider.default_model
        );
    }
    Ok(())
}
