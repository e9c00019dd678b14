use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::{Mutex, MutexGuard, RwLock};

use neviweb::DeviceData;

pub struct Gateway {
    pub id: u64,
    pub name: String,
    pub thermostats: Vec<Arc<Thermostat>>,
}

pub struct Thermostat {
    pub id: u64,
    pub name: String,
    /// Last-seen state: the latest poll reading, or a setpoint written since.
    /// Updated only while holding the write lock.
    data: Mutex<DeviceData>,
    writes: Mutex<()>,
}

impl Thermostat {
    pub fn new(id: u64, name: String) -> Self {
        Self {
            id,
            name,
            data: Mutex::new(DeviceData::default()),
            writes: Mutex::new(()),
        }
    }

    pub async fn data(&self) -> DeviceData {
        *self.data.lock().await
    }

    pub async fn apply(&self, data: DeviceData) {
        *self.data.lock().await = data;
    }

    pub async fn apply_setpoint(&self, setpoint: f64) {
        self.data.lock().await.setpoint = Some(setpoint);
    }

    /// Serializes setpoint writes to this thermostat.
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().await
    }
}

/// Every thermostat known to the current session, grouped by gateway.
#[derive(Default)]
pub struct Storage {
    gateways: RwLock<Vec<Gateway>>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the known topology. Thermostats keeping their id and name
    /// keep their last reading and write lock.
    pub async fn replace(&self, gateways: Vec<neviweb::Gateway>) {
        let mut current = self.gateways.write().await;

        let mut known: HashMap<u64, Arc<Thermostat>> = current
            .iter()
            .flat_map(|gateway| gateway.thermostats.iter())
            .map(|thermostat| (thermostat.id, thermostat.clone()))
            .collect();

        let gateways: Vec<Gateway> = gateways
            .into_iter()
            .map(|gateway| {
                let thermostats = gateway
                    .devices
                    .into_iter()
                    .map(|device| match known.remove(&device.id) {
                        Some(thermostat) if thermostat.name == device.name => thermostat,
                        _ => {
                            debug!("found thermostat {}({})", device.name, device.id);
                            Arc::new(Thermostat::new(device.id, device.name))
                        }
                    })
                    .collect();

                Gateway {
                    id: gateway.id,
                    name: gateway.name,
                    thermostats,
                }
            })
            .collect();

        for thermostat in known.values() {
            debug!("lost thermostat {}({})", thermostat.name, thermostat.id);
        }

        info!(
            "tracking {} thermostats on {} gateways",
            gateways.iter().map(|gateway| gateway.thermostats.len()).sum::<usize>(),
            gateways.len()
        );

        *current = gateways;
    }

    pub async fn thermostats(&self) -> Vec<Arc<Thermostat>> {
        self.gateways
            .read()
            .await
            .iter()
            .flat_map(|gateway| gateway.thermostats.iter().cloned())
            .collect()
    }

    /// First thermostat named `name`, in gateway order.
    pub async fn find(&self, name: &str) -> Option<Arc<Thermostat>> {
        self.gateways
            .read()
            .await
            .iter()
            .flat_map(|gateway| gateway.thermostats.iter())
            .find(|thermostat| thermostat.name == name)
            .cloned()
    }
}
