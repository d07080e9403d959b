//! `questionnaire` - answer a questionnaire in the terminal.
//!
//! Questionnaires are read from `<dir>/<id>.json`; progress and the final
//! response go to `<dir>/<id>.response.json`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use questionnaire_dialoguer::{DialoguerRunner, FileBackend, RunnerError};
use questionnaire_engine::{EngineConfig, ResponseSession, SubmitOutcome};
use questionnaire_types::QuestionnaireId;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for questionnaire
#[derive(Parser, Debug)]
#[command(name = "questionnaire")]
#[command(about = "Answer a conditional questionnaire step by step")]
#[command(version)]
struct Args {
    /// Questionnaire id (file stem of the definition)
    questionnaire: String,

    /// Directory holding questionnaire definitions and responses
    #[arg(short, long, default_value = ".", env = "QUESTIONNAIRE_DIR")]
    dir: PathBuf,

    /// Engine configuration file (TOML)
    #[arg(short, long, env = "QUESTIONNAIRE_CONFIG")]
    config: Option<PathBuf>,

    /// Disable autosave regardless of the configuration
    #[arg(long)]
    no_autosave: bool,

    /// Use the plain prompt theme
    #[arg(long)]
    plain: bool,

    /// Message shown after a successful submission
    #[arg(long, env = "QUESTIONNAIRE_REWARD")]
    reward: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questionnaire_engine=warn,questionnaire_dialoguer=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if args.no_autosave {
        config = config.without_autosave();
    }
    info!(?config, dir = %args.dir.display(), "starting questionnaire");

    let mut backend = FileBackend::new(&args.dir);
    if let Some(reward) = args.reward {
        backend = backend.with_reward_message(reward);
    }

    let questionnaire = QuestionnaireId::from(args.questionnaire);
    let mut session = ResponseSession::open(Arc::new(backend), &questionnaire, &config)
        .await
        .with_context(|| format!("Failed to open questionnaire {questionnaire}"))?;

    let graph = session.graph();
    println!("{}", graph.title());
    if let Some(description) = graph.description() {
        println!("{description}");
    }
    println!();

    let runner = if args.plain {
        DialoguerRunner::plain()
    } else {
        DialoguerRunner::new()
    };

    match runner.run(&mut session).await {
        Ok(Some(SubmitOutcome::Completed { reward_message })) => {
            println!("Thank you, your answers have been submitted.");
            if let Some(message) = reward_message {
                println!("{message}");
            }
        }
        Ok(Some(SubmitOutcome::AlreadyCompleted)) => {
            println!("This questionnaire was already submitted from somewhere else.");
        }
        Ok(None) => {}
        Err(RunnerError::Cancelled) => {
            println!("Cancelled. Answers saved so far are kept.");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
