use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info};

use configs::AppConfig;

fn main() -> ExitCode {
    dotenv().ok();

    let cfg = match AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging("compact");
            error!(service = "auto_shop", event = "config_invalid", error = %e, "configuration rejected");
            return ExitCode::FAILURE;
        }
    };
    common::utils::logging::init_logging(&cfg.logging.format);

    let pid = std::process::id();
    std::panic::set_hook(Box::new(move |info| {
        error!(service = "auto_shop", event = "panic", pid, message = %info, "unhandled panic occurred");
    }));

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "auto_shop", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "auto_shop",
        event = "start",
        pid,
        version = env!("CARGO_PKG_VERSION"),
        threads = cfg.server.worker_threads.unwrap_or_default(),
        db = cfg.database.url.split(':').next().unwrap_or("unknown"),
        "auto shop backend starting"
    );

    let shutdown = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(service = "auto_shop", event = "signal_error", error = %e, "ctrl_c listener failed");
            return;
        }
        info!(service = "auto_shop", event = "shutdown_signal", pid, "received Ctrl+C");
    };

    match rt.block_on(server::serve(cfg, shutdown)) {
        Ok(()) => {
            info!(service = "auto_shop", event = "stop", pid, "server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "auto_shop", event = "run_failed", error = %e, "server exited with error");
            ExitCode::FAILURE
        }
    }
}
