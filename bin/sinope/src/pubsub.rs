use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future;
use futures_util::stream::{Stream, StreamExt};
use log::debug;
use paho_mqtt::{self as mqtt, AsyncClient, ConnectOptions, MessageBuilder};

use transport::Topic;

use crate::{BridgeConfig, Result};

const CLIENT_ID: &str = "sinope";
const KEEP_ALIVE: Duration = Duration::from_secs(30);
const STREAM_BUFFER: usize = 32;

/// Payloads of inbound messages. `None` signals a lost broker connection.
pub type Inbound = Pin<Box<dyn Stream<Item = Option<Vec<u8>>> + Send>>;

#[async_trait]
pub trait PubSubClient: Send + Sync + 'static {
    async fn connect(&self) -> Result<()>;

    /// Registers the inbound message handler. Call before subscribing.
    fn incoming(&self) -> Inbound;

    async fn subscribe(&self, topic: Topic, qos: i32) -> Result<()>;
    async fn publish(&self, topic: Topic, payload: Vec<u8>) -> Result<()>;
    async fn reconnect(&self) -> Result<()>;
    async fn disconnect(&self) -> Result<()>;
}

/// Payload of a message received on `sinope/set`; other topics are dropped.
fn command_payload(topic: &str, payload: &[u8]) -> Option<Vec<u8>> {
    match topic.parse::<Topic>() {
        Ok(Topic::Set) => Some(payload.to_vec()),
        _ => {
            debug!("Ignoring message on topic {topic}");
            None
        }
    }
}

pub struct Mqtt {
    client: AsyncClient,
    options: ConnectOptions,
}

impl Mqtt {
    pub fn new(config: &BridgeConfig) -> Result<Mqtt> {
        let create_opts = mqtt::CreateOptionsBuilder::new_v3()
            .server_uri(config.mqtt_uri())
            .client_id(CLIENT_ID)
            .finalize();

        let client = AsyncClient::new(create_opts)?;

        let mut builder = mqtt::ConnectOptionsBuilder::new_v3();
        builder.keep_alive_interval(KEEP_ALIVE).clean_session(false);

        if let Some(username) = &config.mqtt_username {
            builder.user_name(username.clone());
        }

        if let Some(password) = &config.mqtt_password {
            builder.password(password.clone());
        }

        Ok(Mqtt {
            client,
            options: builder.finalize(),
        })
    }
}

#[async_trait]
impl PubSubClient for Mqtt {
    async fn connect(&self) -> Result<()> {
        self.client.connect(self.options.clone()).await?;
        Ok(())
    }

    fn incoming(&self) -> Inbound {
        let mut client = self.client.clone();
        let stream = client.get_stream(STREAM_BUFFER);

        Box::pin(stream.filter_map(|msg| {
            let item = match msg {
                Some(msg) => command_payload(msg.topic(), msg.payload()).map(Some),
                None => Some(None),
            };
            future::ready(item)
        }))
    }

    async fn subscribe(&self, topic: Topic, qos: i32) -> Result<()> {
        self.client.subscribe(topic.to_string(), qos).await?;
        debug!("Subscribed to topic: {topic}");
        Ok(())
    }

    async fn publish(&self, topic: Topic, payload: Vec<u8>) -> Result<()> {
        let message = MessageBuilder::new()
            .topic(topic.to_string())
            .payload(payload)
            .finalize();

        self.client.publish(message).await?;
        Ok(())
    }

    async fn reconnect(&self) -> Result<()> {
        self.client.reconnect().await?;
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.client.stop_stream();

        if self.client.is_connected() {
            self.client.disconnect(None).await?;
        }

        Ok(())
    }
}
