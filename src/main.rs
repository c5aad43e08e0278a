use std::sync::Arc;

use matside::agents::{CoachAgent, GamePlanAgent, Persona, RecoveryAgent};
use matside::channels::{Channel, CliChannel, HttpChannel};
use matside::config::Config;
use matside::llm::{CompletionGateway, OpenAiGateway};
use matside::prompts::PromptStore;
use matside::router::{Classifier, Router};
use matside::store::{LibSqlStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    let prompts = Arc::new(match &config.prompt_dir {
        Some(dir) => PromptStore::with_overrides(dir)?,
        None => PromptStore::builtin(),
    });

    let gateway: Arc<dyn CompletionGateway> = Arc::new(OpenAiGateway::new(config.gateway.clone())?);
    let store: Arc<dyn Store> = Arc::new(LibSqlStore::open(&config.db_path).await?);

    let student = config
        .student
        .clone()
        .unwrap_or_else(|| "student".to_string());
    let persona = Persona::from_name(&config.persona);

    let router = Arc::new(Router::new(
        Classifier::new(gateway.clone(), prompts.clone()),
        Arc::new(CoachAgent::new(
            gateway.clone(),
            prompts.clone(),
            store.clone(),
            persona,
            student.clone(),
        )),
        Arc::new(GamePlanAgent::new(
            gateway.clone(),
            prompts.clone(),
            store.clone(),
            student,
        )),
        Arc::new(RecoveryAgent::new(gateway.clone(), prompts)),
    ));

    eprintln!("Matside v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", gateway.model_name());
    eprintln!("   Database: {}", config.db_path.display());

    // `matside http` serves the JSON API; anything else is the REPL.
    let channel: Box<dyn Channel> = match std::env::args().nth(1).as_deref() {
        Some("http") => {
            eprintln!("   API: http://0.0.0.0:{}/chat\n", config.http_port);
            Box::new(HttpChannel::new(router, store, config.http_port))
        }
        _ => Box::new(CliChannel::new(router)),
    };

    channel.serve().await?;
    Ok(())
}
