use std::time::Duration;

use log::{debug, info, trace};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{Device, DeviceData, Error, Gateway, Result};

const BASE_URL: &str = "https://neviweb.com/api";
const SESSION_HEADER: &str = "Session-Id";

#[derive(Deserialize)]
struct LoginResponse {
    session: String,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
}

pub struct Client {
    http: reqwest::Client,
    base_url: String,
    email: String,
    password: String,
    session: RwLock<Option<String>>,
}

impl Client {
    pub fn new(email: String, password: String, timeout: Duration) -> Result<Client> {
        Self::with_base_url(BASE_URL, email, password, timeout)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        email: String,
        password: String,
        timeout: Duration,
    ) -> Result<Client> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sinope-mqtt/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Client {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            email,
            password,
            session: RwLock::new(None),
        })
    }

    pub async fn login(&self) -> Result<()> {
        let url = self.url("login");
        debug!("POST {url}");

        let request = self.http.post(url).form(&[
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
            ("stayConnected", "0"),
        ]);

        let response: LoginResponse = self.execute(request).await?;
        *self.session.write().await = Some(response.session);

        info!("logged in to neviweb as {}", self.email);

        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        let session = match self.session.write().await.take() {
            Some(session) => session,
            None => return Ok(()),
        };

        let url = self.url("logout");
        debug!("GET {url}");

        let response = self
            .http
            .get(url)
            .header(SESSION_HEADER, session)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Status(response.status().as_u16()));
        }

        info!("logged out of neviweb");

        Ok(())
    }

    async fn session(&self) -> Result<String> {
        self.session.read().await.clone().ok_or(Error::NotConnected)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

impl Client {
    /// Lists every gateway of the account together with the devices behind it.
    pub async fn gateways(&self) -> Result<Vec<Gateway>> {
        let mut gateways: Vec<Gateway> = self.get("gateway", &[]).await?;

        for gateway in gateways.iter_mut() {
            let gateway_id = gateway.id.to_string();
            let devices: Vec<Device> = self
                .get("device", &[("gatewayId", gateway_id.as_str())])
                .await?;

            debug!(
                "gateway {}({}) has {} devices",
                gateway.name,
                gateway.id,
                devices.len()
            );

            gateway.devices = devices;
        }

        Ok(gateways)
    }

    pub async fn device_data(&self, device_id: u64) -> Result<DeviceData> {
        self.get(&format!("device/{device_id}/data"), &[]).await
    }

    pub async fn set_setpoint(&self, device_id: u64, temperature: f64) -> Result<()> {
        let session = self.session().await?;
        let url = self.url(&format!("device/{device_id}/setpoint"));
        debug!("PUT {url} temperature={temperature}");

        let temperature = temperature.to_string();
        let request = self
            .http
            .put(url)
            .header(SESSION_HEADER, session)
            .form(&[("temperature", temperature.as_str())]);

        let _: Value = self.execute(request).await?;

        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let session = self.session().await?;
        let url = self.url(path);
        debug!("GET {url}");

        let request = self
            .http
            .get(url)
            .header(SESSION_HEADER, session)
            .query(query);

        self.execute(request).await
    }

    /// Sends the request and unwraps the `{"error": {"code": ...}}` envelope
    /// Neviweb returns with a successful status code.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(Error::from_body)?;
        trace!("response: {}", String::from_utf8_lossy(&body));

        let value: Value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body)?
        };

        if let Some(error) = value.get("error").filter(|error| !error.is_null()) {
            let error: ApiError = serde_json::from_value(error.clone())?;
            return Err(Error::from_code(error.code));
        }

        Ok(serde_json::from_value(value)?)
    }
}
