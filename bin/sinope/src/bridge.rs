use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use paho_mqtt::QOS_2;
use tokio::time::sleep;

use transport::Topic;

use crate::{
    refresh, BridgeConfig, Commands, Delivery, GatewayClient, Poller, PubSubClient, Result,
    Shutdown, Storage,
};

/// One session between the Neviweb cloud and the MQTT broker.
pub struct Bridge<G, P> {
    gateway: Arc<G>,
    pubsub: Arc<P>,
    storage: Arc<Storage>,
    poll_interval: Duration,
    refresh_cycles: u32,
    delivery: Option<Delivery>,
}

impl<G: GatewayClient, P: PubSubClient> Bridge<G, P> {
    pub fn new(gateway: G, pubsub: P, config: &BridgeConfig) -> Self {
        Self {
            gateway: Arc::new(gateway),
            pubsub: Arc::new(pubsub),
            storage: Arc::new(Storage::new()),
            poll_interval: config.poll_interval,
            refresh_cycles: config.refresh_cycles,
            delivery: None,
        }
    }

    /// Runs until `shutdown` fires or an error escapes the poll loop. Both
    /// clients are disconnected before returning.
    pub async fn run(mut self, mut shutdown: Shutdown) -> Result<()> {
        let result = self.serve(&mut shutdown).await;
        self.close().await;
        result
    }

    async fn serve(&mut self, shutdown: &mut Shutdown) -> Result<()> {
        tokio::select! {
            result = self.start() => result?,
            _ = shutdown.wait() => return Ok(()),
        }

        let mut poller = Poller::new(
            self.gateway.clone(),
            self.pubsub.clone(),
            self.storage.clone(),
            self.refresh_cycles,
        );

        loop {
            tokio::select! {
                report = poller.poll() => {
                    let report = report?;
                    debug!(
                        "Published {} thermostats, skipped {}",
                        report.published, report.skipped
                    );
                }
                _ = shutdown.wait() => return Ok(()),
            }

            tokio::select! {
                _ = sleep(self.poll_interval) => {}
                _ = shutdown.wait() => return Ok(()),
            }
        }
    }

    async fn start(&mut self) -> Result<()> {
        info!("Connecting to Neviweb");
        self.gateway.connect().await?;
        refresh(self.gateway.as_ref(), &self.storage).await?;

        info!("Connecting to MQTT broker");
        self.pubsub.connect().await?;

        let commands = Commands::new(self.gateway.clone(), self.storage.clone());
        self.delivery = Some(Delivery::start(
            self.pubsub.incoming(),
            commands,
            self.pubsub.clone(),
        ));

        self.pubsub.subscribe(Topic::Set, QOS_2).await?;

        info!("Bridge started");
        Ok(())
    }

    async fn close(&mut self) {
        debug!("Closing bridge");

        if let Some(delivery) = self.delivery.take() {
            delivery.stop().await;
        }

        if let Err(err) = self.gateway.disconnect().await {
            warn!("Error disconnecting from Neviweb: {err}");
        }

        if let Err(err) = self.pubsub.disconnect().await {
            warn!("Error disconnecting from MQTT broker: {err}");
        }
    }
}
