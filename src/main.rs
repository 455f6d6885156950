use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ideaforge::agent::HttpAgentGateway;
use ideaforge::api::{create_router, AppState};
use ideaforge::config::{parse_origins, AgentConfig, ServerConfig, DEFAULT_AGENT_URL};
use ideaforge_core::Database;

#[derive(Parser)]
#[command(name = "ideaforge")]
#[command(about = "Guided idea-to-project pipeline backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve(ServeArgs),
    /// Create or upgrade the database schema and exit
    Migrate {
        #[arg(long, env = "IDEAFORGE_DB")]
        db: Option<PathBuf>,
    },
}

#[derive(clap::Args, Clone)]
struct ServeArgs {
    /// Port for HTTP API
    #[arg(short, long, env = "IDEAFORGE_PORT", default_value_t = ideaforge::config::DEFAULT_PORT)]
    port: u16,

    #[arg(long, env = "IDEAFORGE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// SQLite file; defaults to the platform data directory
    #[arg(long, env = "IDEAFORGE_DB")]
    db: Option<PathBuf>,

    #[arg(long, env = "AGENT_BASE_URL", default_value = DEFAULT_AGENT_URL)]
    agent_url: String,

    #[arg(long, env = "AGENT_TOKEN", hide_env_values = true)]
    agent_token: Option<String>,

    #[arg(long, env = "AGENT_TIMEOUT_SECS", default_value_t = 30)]
    agent_timeout_secs: u64,

    #[arg(long, env = "AGENT_GLOBAL_TIMEOUT_SECS", default_value_t = 60)]
    agent_global_timeout_secs: u64,

    /// Comma-separated; empty allows any origin
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "")]
    allowed_origins: String,
}

impl ServeArgs {
    fn into_config(self) -> ServerConfig {
        let mut agent = AgentConfig::default()
            .with_base_url(self.agent_url)
            .with_timeout(Duration::from_secs(self.agent_timeout_secs))
            .with_global_chat_timeout(Duration::from_secs(self.agent_global_timeout_secs));
        if let Some(token) = self.agent_token.filter(|t| !t.is_empty()) {
            agent = agent.with_auth_token(token);
        }

        ServerConfig {
            host: self.host,
            port: self.port,
            database_path: self.db,
            allowed_origins: parse_origins(&self.allowed_origins),
            agent,
            ..ServerConfig::default()
        }
    }
}

fn open_database(path: Option<&PathBuf>) -> anyhow::Result<Database> {
    let db = match path {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let db = open_database(config.database_path.as_ref())?;
    let gateway = HttpAgentGateway::new(config.agent.clone())?;
    tracing::info!(
        agent = %gateway.config().base_url,
        timeout = ?gateway.config().timeout,
        "Agent gateway configured"
    );

    let state = AppState::new(db, Arc::new(gateway), config.initial_content_timeout);
    let app = create_router(state, &config);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("IdeaForge server listening on http://{}", address);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "ideaforge=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => serve(args.into_config()).await?,
        Some(Commands::Migrate { db }) => {
            let db = open_database(db.as_ref())?;
            tracing::info!(version = db.schema_version()?, "Database schema is up to date");
        }
        None => serve(cli.serve.into_config()).await?,
    }

    Ok(())
}
