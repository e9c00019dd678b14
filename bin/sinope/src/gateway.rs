use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use neviweb::{DeviceData, Gateway};

/// Vendor side of the bridge. Every call may time out.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GatewayClient: Send + Sync + 'static {
    async fn connect(&self) -> neviweb::Result<()>;
    async fn read_gateways(&self) -> neviweb::Result<Vec<Gateway>>;
    async fn read_thermostat(&self, id: u64) -> neviweb::Result<DeviceData>;
    async fn write_setpoint(&self, id: u64, setpoint: f64) -> neviweb::Result<()>;
    async fn disconnect(&self) -> neviweb::Result<()>;
}

#[async_trait]
impl GatewayClient for neviweb::Client {
    async fn connect(&self) -> neviweb::Result<()> {
        self.login().await
    }

    async fn read_gateways(&self) -> neviweb::Result<Vec<Gateway>> {
        self.gateways().await
    }

    async fn read_thermostat(&self, id: u64) -> neviweb::Result<DeviceData> {
        self.device_data(id).await
    }

    async fn write_setpoint(&self, id: u64, setpoint: f64) -> neviweb::Result<()> {
        self.set_setpoint(id, setpoint).await
    }

    async fn disconnect(&self) -> neviweb::Result<()> {
        self.logout().await
    }
}
