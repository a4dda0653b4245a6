use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use munigraph_api::{AppState, Server};
use munigraph_core::{ConfigManager, EventSource, LoggingConfig};
use munigraph_graph::{active_communes, extract, ViewModel};
use munigraph_source::{FileEventSource, MunicipalEventSource};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "munigraph")]
#[command(about = "Lineage graph of Swiss municipality changes", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding default.toml, {env}.toml and local.toml
    #[arg(long, global = true, env = "MUNIGRAPH_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Configuration environment name
    #[arg(long, global = true)]
    env: Option<String>,

    /// Read events from a JSON snapshot instead of the SPARQL endpoint
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the graph and serve the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the active commune options as JSON
    Communes,

    /// Print the connected component of one interval as JSON
    Export {
        /// Interval id, e.g. "Olten (1850-1900)"
        #[arg(long)]
        focus: String,

        /// Emit the flat renderer element list instead of the view model
        #[arg(long)]
        elements: bool,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{},tower_http=info", logging.level).into());
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "pretty" {
        registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigManager::load(cli.config_dir.clone(), cli.env.clone())
        .context("failed to load configuration")?;
    let settings = config.settings().clone();
    init_tracing(&settings.logging);
    info!(
        config_dir = %config.config_dir().display(),
        env = config.env(),
        "configuration loaded"
    );

    let source: Arc<dyn EventSource> = match &cli.fixture {
        Some(path) => Arc::new(FileEventSource::new(path)),
        None => Arc::new(MunicipalEventSource::new(settings.source.clone())?),
    };

    let state = AppState::new(source, settings.graph.clone())
        .await
        .context("initial graph build failed")?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(settings.server.host);
            let ip: IpAddr = host
                .parse()
                .with_context(|| format!("invalid listen address: {}", host))?;
            let addr = SocketAddr::new(ip, port.unwrap_or(settings.server.port));
            Server::new(state, addr).run().await?;
        }
        Commands::Communes => {
            let communes = active_communes(&state.snapshot().graph);
            println!("{}", serde_json::to_string_pretty(&communes)?);
        }
        Commands::Export { focus, elements } => {
            let snapshot = state.snapshot();
            let component = extract(&snapshot.graph, &focus)?;
            let view = ViewModel::from_graph(&component);
            let json = if elements {
                serde_json::to_string_pretty(&view.elements())?
            } else {
                serde_json::to_string_pretty(&view)?
            };
            println!("{}", json);
        }
    }

    Ok(())
}
