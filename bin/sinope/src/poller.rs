use std::sync::Arc;

use log::{debug, error, info, warn};

use transport::{Status, Topic};

use crate::{GatewayClient, PubSubClient, Result, Storage, Thermostat};

/// Outcome of one poll cycle.
#[derive(Debug, Default, PartialEq)]
pub struct Report {
    pub published: usize,
    pub skipped: usize,
    pub refreshed: bool,
}

pub struct Poller<G, P> {
    gateway: Arc<G>,
    pubsub: Arc<P>,
    storage: Arc<Storage>,
    refresh_cycles: u32,
    cycles: u32,
}

impl<G: GatewayClient, P: PubSubClient> Poller<G, P> {
    pub fn new(
        gateway: Arc<G>,
        pubsub: Arc<P>,
        storage: Arc<Storage>,
        refresh_cycles: u32,
    ) -> Self {
        Self {
            gateway,
            pubsub,
            storage,
            refresh_cycles: refresh_cycles.max(1),
            cycles: 0,
        }
    }

    /// Reads and publishes every known thermostat, then re-reads the
    /// gateways every `refresh_cycles` calls.
    pub async fn poll(&mut self) -> Result<Report> {
        debug!("Updating thermostats");

        let mut report = Report::default();

        for thermostat in self.storage.thermostats().await {
            let published = match self.update(&thermostat).await? {
                Some(status) => self.publish(&status).await,
                None => false,
            };

            if published {
                report.published += 1;
            } else {
                report.skipped += 1;
            }
        }

        self.cycles += 1;

        if self.cycles >= self.refresh_cycles {
            info!("Refreshing Sinope gateways");
            refresh(self.gateway.as_ref(), &self.storage).await?;

            self.cycles = 0;
            report.refreshed = true;
        }

        Ok(report)
    }

    /// Refreshes the last-seen state of `thermostat`. The read holds the write
    /// lock so a setpoint written meanwhile is not overwritten by an older
    /// reading.
    async fn update(&self, thermostat: &Thermostat) -> Result<Option<Status>> {
        let _guard = thermostat.lock_writes().await;

        let data = match self.gateway.read_thermostat(thermostat.id).await {
            Ok(data) => data,
            Err(err) if err.is_timeout() => {
                warn!(
                    "Thermostat {}({}) was unreachable",
                    thermostat.name, thermostat.id
                );
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        thermostat.apply(data).await;

        let data = thermostat.data().await;
        match (data.temperature, data.setpoint) {
            (Some(temperature), Some(setpoint)) => Ok(Some(Status {
                name: thermostat.name.clone(),
                temperature,
                setpoint,
            })),
            _ => {
                warn!(
                    "Thermostat {}({}) has no reading",
                    thermostat.name, thermostat.id
                );
                Ok(None)
            }
        }
    }

    async fn publish(&self, status: &Status) -> bool {
        let payload = match serde_json::to_vec(status) {
            Ok(payload) => payload,
            Err(err) => {
                error!("Error serializing status of {}: {err}", status.name);
                return false;
            }
        };

        debug!("MQTT Publishing: {}", String::from_utf8_lossy(&payload));

        match self.pubsub.publish(Topic::Status, payload).await {
            Ok(()) => true,
            Err(err) => {
                error!("Error publishing status of {}: {err}", status.name);
                false
            }
        }
    }
}

/// Re-enumerates gateways and their thermostats into `storage`.
pub async fn refresh<G: GatewayClient>(gateway: &G, storage: &Storage) -> Result<()> {
    debug!("Reading gateways");

    let gateways = gateway.read_gateways().await?;
    storage.replace(gateways).await;

    Ok(())
}
