use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing::info;

use debate_agents::cli::{self, CheckpointTarget};
use debate_agents::{server, AgentFactory, AgentsConfig};
use orchestration::debate::{Article, CheckpointManager};
use orchestration::session::new_debate_id;
use orchestration::{DebateService, InMemorySessionStore};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP debate service
    Serve {
        #[arg(long, default_value = "127.0.0.1:8000")]
        bind: String,
        /// Allow cross-origin requests from any origin
        #[arg(long, default_value_t = false)]
        cors: bool,
    },
    /// Debate an article interactively in the terminal
    Debate {
        #[arg(long)]
        title: Option<String>,
        /// File holding the article body
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        source: Option<String>,
        /// Write a checkpoint here after every run
        #[arg(long)]
        checkpoint: Option<PathBuf>,
        /// Resume from a checkpoint file
        #[arg(long)]
        resume: Option<PathBuf>,
        /// Only summarize the article
        #[arg(long, default_value_t = false)]
        analyze_only: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AgentsConfig::from_env();
    if let Err(e) = config.validate() {
        bail!("Invalid configuration: {e}");
    }
    info!(
        endpoint = %config.endpoint.url,
        model = %config.endpoint.model,
        evidence = config.fact_check_api_key.is_some(),
        "Debate agents starting"
    );

    let factory = AgentFactory::new(&config)?;

    match cli.command {
        Command::Serve { bind, cors } => {
            let engine = factory.build_engine()?;
            let service = Arc::new(DebateService::new(
                engine,
                Arc::new(InMemorySessionStore::new()),
            ));
            server::run_server(service, &bind, cors).await
        }
        Command::Debate {
            title,
            file,
            source,
            checkpoint,
            resume,
            analyze_only,
        } => {
            let mut engine_config = config.engine_config();
            engine_config.analyze_only = analyze_only;
            let engine = orchestration::DebateEngine::with_config(
                Arc::new(factory.build_generation()),
                Arc::new(factory.build_verifier()?),
                engine_config,
            );

            let (state, target) = match resume {
                Some(path) => {
                    let (cp, status) = CheckpointManager::load(&path)
                        .with_context(|| format!("Failed to resume from {}", path.display()))?;
                    info!(debate_id = %cp.debate_id, sequence = cp.sequence, ?status, "Resuming debate");
                    let target = CheckpointTarget {
                        manager: CheckpointManager::resume_from(&cp, 5),
                        path: checkpoint.unwrap_or(path),
                    };
                    (cp.state, Some(target))
                }
                None => {
                    let (Some(title), Some(file)) = (title, file) else {
                        bail!("--title and --file are required unless --resume is given");
                    };
                    let content = tokio::fs::read_to_string(&file)
                        .await
                        .with_context(|| format!("Failed to read {}", file.display()))?;
                    let mut article = Article::new(title, content);
                    if let Some(source) = source {
                        article = article.with_source(source);
                    }
                    let target = checkpoint.map(|path| CheckpointTarget {
                        manager: CheckpointManager::new(new_debate_id(), 5),
                        path,
                    });
                    (engine.initialize(article), target)
                }
            };

            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            cli::run_interactive(&engine, state, stdin, &mut stdout, target).await?;
            Ok(())
        }
    }
}
