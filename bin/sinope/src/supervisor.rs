use log::{info, warn};
use tokio::time::sleep;

use crate::{Bridge, BridgeConfig, GatewayClient, PubSubClient, Result, Shutdown};

/// Runs bridge sessions until shutdown. Connection errors restart the
/// session with fresh clients after `config.retry`; anything else is returned.
pub async fn supervise<G, P, F>(
    config: &BridgeConfig,
    mut connect: F,
    mut shutdown: Shutdown,
) -> Result<()>
where
    G: GatewayClient,
    P: PubSubClient,
    F: FnMut() -> Result<(G, P)>,
{
    loop {
        let (gateway, pubsub) = connect()?;

        match Bridge::new(gateway, pubsub, config)
            .run(shutdown.clone())
            .await
        {
            Ok(()) => {
                info!("Bridge stopped");
                return Ok(());
            }
            Err(err) if err.is_connection() => {
                warn!(
                    "Connection error, retrying in {}s: {err:?}",
                    config.retry.as_secs()
                );

                tokio::select! {
                    _ = sleep(config.retry) => {}
                    _ = shutdown.wait() => return Ok(()),
                }
            }
            Err(err) => return Err(err),
        }
    }
}
