use std::process::ExitCode;

use dotenvy::dotenv;
use tokio::runtime::{Builder, Runtime};
use tracing::{error, info};
use uuid::Uuid;

const SERVICE: &str = "postboard";

/// Process identity attached to lifecycle events.
#[derive(Clone, Copy)]
struct ProcessInfo {
    service_id: Uuid,
    pid: u32,
}

fn init_logging() {
    // .env before the subscriber so RUST_LOG and LOG_FORMAT apply
    dotenv().ok();
    common::utils::logging::init_logging_from_env();
    info!(service = SERVICE, event = "logger_init", "tracing subscriber initialized");
}

fn install_panic_hook(proc_info: ProcessInfo) {
    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = SERVICE,
            event = "panic",
            service_id = %proc_info.service_id,
            pid = proc_info.pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));
}

fn build_runtime(worker_threads: Option<usize>) -> std::io::Result<Runtime> {
    let mut builder = Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }
    builder.build()
}

async fn serve_until_ctrl_c(proc_info: ProcessInfo) -> ExitCode {
    let server_task = tokio::spawn(server::run());

    tokio::select! {
        res = server_task => match res {
            Ok(Ok(())) => {
                info!(service = SERVICE, event = "stop", service_id = %proc_info.service_id, "server stopped normally");
                ExitCode::SUCCESS
            }
            Ok(Err(e)) => {
                error!(service = SERVICE, event = "run_failed", error = %e, "server::run returned error");
                ExitCode::FAILURE
            }
            Err(e) => {
                error!(service = SERVICE, event = "task_join_error", error = %e, "server task join error");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!(service = SERVICE, event = "shutdown_signal", service_id = %proc_info.service_id, "received Ctrl+C, shutting down");
            // writes land via temp-file rename, so dropping in-flight requests leaves whole files
            ExitCode::SUCCESS
        }
    }
}

fn main() -> ExitCode {
    init_logging();

    let proc_info = ProcessInfo { service_id: Uuid::new_v4(), pid: std::process::id() };
    install_panic_hook(proc_info);

    // server::run loads the config again; here it only sizes the runtime
    let worker_threads = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg.server.worker_threads,
        Err(e) => {
            error!(service = SERVICE, event = "config_invalid", error = %e, "configuration rejected");
            return ExitCode::FAILURE;
        }
    };

    let rt = match build_runtime(worker_threads) {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = SERVICE, event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = SERVICE,
        event = "start",
        service_id = %proc_info.service_id,
        pid = proc_info.pid,
        version = env!("CARGO_PKG_VERSION"),
        threads = worker_threads.unwrap_or_default(),
        "postboard server starting"
    );

    rt.block_on(serve_until_ctrl_c(proc_info))
}
