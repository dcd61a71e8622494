use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use log::{error, info};
use pixie_api::{
    server::wait_for_signal,
    utils::{DEFAULT_CONFIG_PATH, DEFAULT_GRACE_PERIOD_SECS, DEFAULT_LOG_FILTER},
    BootService, Server, ServerOptions, ServiceConfig, Shutdown,
};

/// Boot configuration API for network-booted machines.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the JSON descriptor with listen address, repository and servers
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Seconds in-flight requests may take to finish after SIGINT/SIGTERM
    #[arg(long, default_value_t = DEFAULT_GRACE_PERIOD_SECS)]
    grace_period: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();
    let args = Args::parse();

    info!("Starting pixie API...");
    // No listener may exist before the descriptor is known to be good.
    let config = match ServiceConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => return ExitCode::from(e.exit_code()),
    };
    let addr = config.bind_address();
    let service = BootService::new(config);
    info!(
        "{} server configuration(s) loaded, repository at {}.",
        service.store().len(),
        service.resources().root().display()
    );

    let listener = match Server::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(e.exit_code());
        }
    };

    let (shutdown, signal) = Shutdown::new();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.cancel();
    });

    let options = ServerOptions::new().grace_period(Duration::from_secs(args.grace_period));
    match Server::new(service, options).serve(listener, signal).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
