use clap::Parser;
use log::info;
use tokio::signal::unix::{signal, SignalKind};

use sinope::{level_filter, supervise, Args, Mqtt, Result, Shutdown};

type ErasedError = Box<dyn std::error::Error + Send + Sync + 'static>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> std::result::Result<(), ErasedError> {
    let args = Args::parse();

    pretty_env_logger::formatted_timed_builder()
        .filter_level(level_filter(args.verbose))
        .parse_default_env()
        .init();

    info!("sinope version {VERSION}");

    let config = args.into_config();

    let (stop, shutdown) = Shutdown::new();
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("got SIGINT, exiting..."),
            _ = terminate.recv() => info!("got SIGTERM, exiting..."),
        }

        let _ = stop.send(true);
    });

    supervise(
        &config,
        || -> Result<(neviweb::Client, Mqtt)> {
            let gateway = neviweb::Client::new(
                config.username.clone(),
                config.password.clone(),
                config.timeout,
            )?;
            let pubsub = Mqtt::new(&config)?;

            Ok((gateway, pubsub))
        },
        shutdown,
    )
    .await?;

    Ok(())
}
