use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use pulse_http::listener::Listener;
use pulse_http::server::Server;
use pulse_server::cli::Cli;
use pulse_server::status::{StatusProvider, SystemdStatus};
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("pulse: {e}");
            return ExitCode::FAILURE;
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(config.max_level()).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("pulse: setting default subscriber failed: {e}");
        return ExitCode::FAILURE;
    }

    let provider: Arc<dyn StatusProvider> = match SystemdStatus::connect(&config.systemctl).await {
        Ok(status) => Arc::new(status),
        Err(e) => {
            error!(cause = %e, "error connecting to system manager");
            return ExitCode::FAILURE;
        }
    };

    let router = config.build_router(&provider);

    let listener = match Listener::create(&config.listener_config()) {
        Ok(listener) => listener,
        Err(e) => {
            error!(cause = %e, port = config.port, "error creating server socket");
            provider.disconnect().await;
            return ExitCode::FAILURE;
        }
    };

    Server::new(listener, router).decoder(config.decoder()).read_timeout(config.read_timeout()).run(shutdown_signal()).await;

    provider.disconnect().await;
    info!("exiting");
    ExitCode::SUCCESS
}

/// Completes on `SIGINT`, or on `SIGTERM` where signals exist.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(cause = %e, "failed to listen for interrupt");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(cause = %e, "failed to listen for terminate");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => info!("received interrupt"),
        () = terminate => info!("received terminate"),
    }
}
