//! storyloom - Runs a project's outline pipeline to Ready.
//!
//! Usage: `storyloom <project-id> <idea...>`

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storyloom::adapters::{
    FilePipelineStorage, FilesystemSkillStore, LruThinkingCache, OpenAiCompatibleConfig,
    OpenAiCompatibleProvider,
};
use storyloom::application::{
    PipelineRunner, ProjectBrief, RunPipelineCommand, RunPipelineHandler, SkillRouter,
    ThinkingEngine, ThinkingSettings,
};
use storyloom::config::{AppConfig, LogConfig, ModelVendor};
use storyloom::domain::foundation::ProjectId;
use storyloom::ports::ModelProvider;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {}", err);
            return ExitCode::from(2);
        }
    };
    init_tracing(&config.log);

    if let Err(err) = config.validate() {
        tracing::error!(error = %err, "invalid configuration");
        return ExitCode::from(2);
    }

    let mut args = std::env::args().skip(1);
    let (project_id, idea) = match (args.next(), args.collect::<Vec<_>>().join(" ")) {
        (Some(project_id), idea) if !idea.trim().is_empty() => (project_id, idea),
        _ => {
            eprintln!("usage: storyloom <project-id> <idea...>");
            return ExitCode::from(2);
        }
    };
    let project_id = match ProjectId::new(project_id) {
        Ok(id) => id,
        Err(err) => {
            eprintln!("invalid project id: {}", err);
            return ExitCode::from(2);
        }
    };

    let model = match build_model(&config) {
        Ok(model) => model,
        Err(message) => {
            tracing::error!(%message, "cannot build model provider");
            return ExitCode::from(2);
        }
    };

    let engine = ThinkingEngine::new(
        model,
        Arc::new(LruThinkingCache::new(config.thinking.cache_capacity)),
        ThinkingSettings::from_config(&config.thinking, Some(config.model.temperature)),
    );
    let router = SkillRouter::new(
        Arc::new(FilesystemSkillStore::new(&config.skills.skills_dir)),
        config.skills.clone(),
    );
    let runner = PipelineRunner::new(
        Arc::new(FilePipelineStorage::new(&config.storage.output_dir)),
        Arc::new(router),
        Arc::new(engine),
        config.pipeline.clone(),
    );
    let handler = RunPipelineHandler::new(Arc::new(runner));

    let cmd = RunPipelineCommand {
        project_id,
        brief: ProjectBrief::from_idea(idea),
        regenerate_from: None,
    };

    match handler.handle(cmd).await {
        Ok(result) => {
            let generated: Vec<&str> = result.generated.iter().map(|s| s.as_str()).collect();
            println!(
                "{} is ready; generated: [{}]",
                result.state.project_id,
                generated.join(", ")
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            match err.failure_report() {
                Some(report) => match serde_json::to_string_pretty(&report) {
                    Ok(json) => eprintln!("{}", json),
                    Err(_) => eprintln!("{}", report),
                },
                None => eprintln!("{}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LogConfig::default_filter()));

    let registry = tracing_subscriber::registry().with(filter);
    if log.json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

fn build_model(config: &AppConfig) -> Result<Arc<dyn ModelProvider>, String> {
    if config.model.vendor == ModelVendor::Mock {
        return Err("the mock vendor has no scripted responses outside tests".to_string());
    }
    let api_key = config
        .model
        .api_key
        .clone()
        .ok_or_else(|| "model API key is not set".to_string())?;
    let provider_config = OpenAiCompatibleConfig::new(api_key)
        .with_model(config.model.model_name())
        .with_base_url(config.model.base_url())
        .with_timeout(config.thinking.timeout());
    let provider = OpenAiCompatibleProvider::new(provider_config).map_err(|e| e.to_string())?;
    Ok(Arc::new(provider))
}
