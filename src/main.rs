use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use manofwar::cli::Cli;
use manofwar::config::{AppState, Config};
use manofwar::error::StartupError;
use manofwar::{logger, server};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Nothing is logged through tracing until the subscriber is installed
    let cfg = match Config::load(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("fatal: {}", StartupError::from(e));
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logger::init(&cfg.logging) {
        eprintln!("fatal: {}", StartupError::from(e));
        return ExitCode::FAILURE;
    }

    match start(&cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

fn start(cfg: &Config) -> Result<(), StartupError> {
    let media_root = cfg.media_root()?;
    if !media_root.is_dir() {
        tracing::warn!("Media directory {} does not exist yet", media_root.display());
    }
    let addr = cfg.get_socket_addr()?;

    // Create the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(StartupError::Runtime)?;

    runtime.block_on(async {
        let listener = server::create_listener(addr)
            .map_err(|source| StartupError::Bind { addr, source })?;
        let state = Arc::new(AppState::new(cfg, media_root.clone()));

        logger::log_server_start(&addr, cfg, &media_root);
        server::run(listener, state, server::shutdown_signal()).await;
        tracing::info!("Server stopped");
        Ok::<(), StartupError>(())
    })
}
