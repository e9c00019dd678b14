use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use log::{debug, error, info, warn};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::sleep;

use transport::Command;

use crate::{Error, GatewayClient, Inbound, PubSubClient, Result, Storage};

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Applies `sinope/set` commands to the vendor cloud.
pub struct Commands<G> {
    gateway: Arc<G>,
    storage: Arc<Storage>,
}

impl<G> Clone for Commands<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            storage: self.storage.clone(),
        }
    }
}

impl<G: GatewayClient> Commands<G> {
    pub fn new(gateway: Arc<G>, storage: Arc<Storage>) -> Self {
        Self { gateway, storage }
    }

    pub async fn apply(&self, payload: &[u8]) -> Result<()> {
        let command: Command = serde_json::from_slice(payload)?;

        let thermostat = self
            .storage
            .find(&command.name)
            .await
            .ok_or_else(|| Error::UnknownThermostat(command.name.clone()))?;

        let Some(setpoint) = command.setpoint else {
            debug!("Nothing to change on {}", thermostat.name);
            return Ok(());
        };

        let _guard = thermostat.lock_writes().await;

        info!(
            "Setting {}({}) setpoint to {setpoint}",
            thermostat.name, thermostat.id
        );
        self.gateway.write_setpoint(thermostat.id, setpoint).await?;
        thermostat.apply_setpoint(setpoint).await;

        Ok(())
    }
}

/// Background task draining the inbound stream. Stopping it also cancels
/// the commands it started.
pub struct Delivery {
    handle: JoinHandle<()>,
}

impl Delivery {
    pub fn start<G: GatewayClient, P: PubSubClient>(
        mut inbound: Inbound,
        commands: Commands<G>,
        pubsub: Arc<P>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            // dropped with this task, aborting commands still in flight
            let mut applying = JoinSet::new();

            loop {
                tokio::select! {
                    msg = inbound.next() => match msg {
                        Some(Some(payload)) => {
                            debug!("MQTT Received: {}", String::from_utf8_lossy(&payload));

                            let commands = commands.clone();
                            applying.spawn(async move {
                                if let Err(err) = commands.apply(&payload).await {
                                    error!("Error applying command: {err}");
                                }
                            });
                        }
                        Some(None) => {
                            warn!("Lost MQTT connection. Attempting reconnect.");

                            while let Err(err) = pubsub.reconnect().await {
                                error!("Error reconnecting: {err}");
                                sleep(RECONNECT_DELAY).await;
                            }

                            info!("Reconnected to MQTT broker");
                        }
                        None => break,
                    },
                    Some(_) = applying.join_next(), if !applying.is_empty() => {}
                }
            }

            debug!("Inbound stream closed");

            while applying.join_next().await.is_some() {}
        });

        Self { handle }
    }

    pub async fn stop(mut self) {
        self.handle.abort();
        let _ = (&mut self.handle).await;
    }
}

impl Drop for Delivery {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
