use std::process::ExitCode;

use ablage::cli::{Cli, Commands};
use ablage::config::AppConfig;
use ablage::llm::OllamaClient;
use ablage::{logging, pipeline, watcher};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = match &cli.command {
        Commands::Run(args) => &args.config,
        Commands::Watch(args) => &args.config,
    };

    // Config comes first: the log file lives in the configured report folder.
    let config = match AppConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(cli.verbose, &config.report_folder) {
        eprintln!("Failed to open log file: {e}");
        return ExitCode::FAILURE;
    }

    let result = match &cli.command {
        Commands::Run(_) => run(&config),
        Commands::Watch(_) => watch(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn connect(config: &AppConfig) -> Result<OllamaClient, String> {
    OllamaClient::new(&config.ollama_url, config.ollama_timeout_secs).map_err(|e| e.to_string())
}

fn run(config: &AppConfig) -> Result<(), String> {
    let llm = connect(config)?;
    let summary = pipeline::runner::run_batch(config, &llm).map_err(|e| e.to_string())?;
    if let Some(report) = &summary.report_path {
        tracing::info!(
            processed = summary.processed,
            failed = summary.failed,
            report = %report.display(),
            "done"
        );
    }
    Ok(())
}

fn watch(config: &AppConfig) -> Result<(), String> {
    let llm = connect(config)?;
    watcher::watch(config, &llm).map_err(|e| e.to_string())
}
