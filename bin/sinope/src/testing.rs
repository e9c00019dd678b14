use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use neviweb::{Device, DeviceData};
use transport::Topic;

use crate::{GatewayClient, Inbound, PubSubClient, Result};

pub fn device(id: u64, name: &str) -> Device {
    Device {
        id,
        name: name.to_string(),
    }
}

pub fn gateway(id: u64, devices: &[(u64, &str)]) -> neviweb::Gateway {
    neviweb::Gateway {
        id,
        name: format!("gateway {id}"),
        devices: devices.iter().map(|(id, name)| device(*id, name)).collect(),
    }
}

pub fn reading(temperature: f64, setpoint: f64) -> DeviceData {
    DeviceData {
        temperature: Some(temperature),
        setpoint: Some(setpoint),
    }
}

#[derive(Default)]
struct Inner {
    published: Mutex<Vec<(Topic, Vec<u8>)>>,
    subscriptions: Mutex<Vec<(Topic, i32)>>,
    inbound: Mutex<Option<mpsc::Receiver<Option<Vec<u8>>>>>,
    failing_publishes: AtomicUsize,
    connects: AtomicUsize,
    reconnects: AtomicUsize,
    disconnects: AtomicUsize,
}

/// In-memory broker. Clones share state so tests can inspect a broker
/// after handing it to the bridge.
#[derive(Clone, Default)]
pub struct FakeBroker {
    inner: Arc<Inner>,
}

impl FakeBroker {
    pub fn new() -> (FakeBroker, mpsc::Sender<Option<Vec<u8>>>) {
        let (sender, receiver) = mpsc::channel(16);
        let broker = FakeBroker::default();
        *broker.inner.inbound.lock().unwrap() = Some(receiver);
        (broker, sender)
    }

    /// Makes the next `count` publishes fail.
    pub fn fail_publishes(&self, count: usize) {
        self.inner.failing_publishes.store(count, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<(Topic, serde_json::Value)> {
        self.inner
            .published
            .lock()
            .unwrap()
            .iter()
            .map(|(topic, payload)| (*topic, serde_json::from_slice(payload).unwrap()))
            .collect()
    }

    pub fn subscriptions(&self) -> Vec<(Topic, i32)> {
        self.inner.subscriptions.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    pub fn reconnects(&self) -> usize {
        self.inner.reconnects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.inner.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PubSubClient for FakeBroker {
    async fn connect(&self) -> Result<()> {
        self.inner.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn incoming(&self) -> Inbound {
        let receiver = self
            .inner
            .inbound
            .lock()
            .unwrap()
            .take()
            .expect("incoming registered once");

        Box::pin(ReceiverStream::new(receiver))
    }

    async fn subscribe(&self, topic: Topic, qos: i32) -> Result<()> {
        self.inner.subscriptions.lock().unwrap().push((topic, qos));
        Ok(())
    }

    async fn publish(&self, topic: Topic, payload: Vec<u8>) -> Result<()> {
        let failing = self.inner.failing_publishes.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |count| count.checked_sub(1),
        );
        if failing.is_ok() {
            return Err(paho_mqtt::Error::General("publish refused").into());
        }

        self.inner.published.lock().unwrap().push((topic, payload));
        Ok(())
    }

    async fn reconnect(&self) -> Result<()> {
        self.inner.reconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.inner.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct Cloud {
    gateways: Mutex<Vec<neviweb::Gateway>>,
    readings: Mutex<HashMap<u64, DeviceData>>,
    writes: Mutex<Vec<(u64, f64)>>,
    read_delay: Mutex<Duration>,
    write_delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    refuse_connect: AtomicBool,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
}

/// Stateful vendor cloud. Writes update the readings returned afterwards.
#[derive(Clone, Default)]
pub struct FakeGateway {
    cloud: Arc<Cloud>,
}

impl FakeGateway {
    pub fn new(gateways: Vec<neviweb::Gateway>) -> Self {
        let gateway = FakeGateway::default();
        *gateway.cloud.gateways.lock().unwrap() = gateways;
        gateway
    }

    pub fn set_reading(&self, id: u64, data: DeviceData) {
        self.cloud.readings.lock().unwrap().insert(id, data);
    }

    /// Delays read responses. The reading is taken when the call starts.
    pub fn set_read_delay(&self, delay: Duration) {
        *self.cloud.read_delay.lock().unwrap() = delay;
    }

    pub fn set_write_delay(&self, delay: Duration) {
        *self.cloud.write_delay.lock().unwrap() = delay;
    }

    pub fn refuse_connect(&self, refuse: bool) {
        self.cloud.refuse_connect.store(refuse, Ordering::SeqCst);
    }

    pub fn writes(&self) -> Vec<(u64, f64)> {
        self.cloud.writes.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.cloud.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn connects(&self) -> usize {
        self.cloud.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.cloud.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GatewayClient for FakeGateway {
    async fn connect(&self) -> neviweb::Result<()> {
        self.cloud.connects.fetch_add(1, Ordering::SeqCst);

        if self.cloud.refuse_connect.load(Ordering::SeqCst) {
            return Err(neviweb::Error::Timeout);
        }

        Ok(())
    }

    async fn read_gateways(&self) -> neviweb::Result<Vec<neviweb::Gateway>> {
        Ok(self.cloud.gateways.lock().unwrap().clone())
    }

    async fn read_thermostat(&self, id: u64) -> neviweb::Result<DeviceData> {
        let data = self
            .cloud
            .readings
            .lock()
            .unwrap()
            .get(&id)
            .copied()
            .unwrap_or_default();

        let delay = *self.cloud.read_delay.lock().unwrap();
        tokio::time::sleep(delay).await;

        Ok(data)
    }

    async fn write_setpoint(&self, id: u64, setpoint: f64) -> neviweb::Result<()> {
        let in_flight = self.cloud.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.cloud.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let delay = *self.cloud.write_delay.lock().unwrap();
        tokio::time::sleep(delay).await;

        self.cloud.writes.lock().unwrap().push((id, setpoint));
        self.cloud
            .readings
            .lock()
            .unwrap()
            .entry(id)
            .or_default()
            .setpoint = Some(setpoint);

        self.cloud.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> neviweb::Result<()> {
        self.cloud.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
