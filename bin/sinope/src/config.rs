use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

pub const DEFAULT_MQTT_SERVER: &str = "localhost";
pub const DEFAULT_MQTT_PORT: u16 = 1883;
pub const DEFAULT_TIMEOUT: u64 = 10;
pub const DEFAULT_RETRY: u64 = 5;
pub const DEFAULT_POLL_INTERVAL: u64 = 20;
pub const DEFAULT_REFRESH_CYCLES: u32 = 5;

/// Sinope thermostat MQTT bridge
#[derive(Parser, Debug)]
#[command(name = "sinope", version, about)]
pub struct Args {
    /// Neviweb username (email address)
    #[arg(short, long, env = "NEVIWEB_USERNAME")]
    pub username: String,

    /// Neviweb password
    #[arg(short, long, env = "NEVIWEB_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// MQTT server url or IP
    #[arg(short = 'm', long, env = "MQTT_SERVER", default_value = DEFAULT_MQTT_SERVER)]
    pub mqtt_server: String,

    /// MQTT server port
    #[arg(short = 'P', long, env = "MQTT_PORT", default_value_t = DEFAULT_MQTT_PORT)]
    pub mqtt_port: u16,

    /// MQTT username
    #[arg(long, env = "MQTT_USER")]
    pub mqtt_username: Option<String>,

    /// MQTT password
    #[arg(long, env = "MQTT_PASS", hide_env_values = true)]
    pub mqtt_password: Option<String>,

    /// Neviweb communication timeout in seconds
    #[arg(short, long, env = "NEVIWEB_TIMEOUT", default_value_t = DEFAULT_TIMEOUT)]
    pub timeout: u64,

    /// Seconds to wait before retrying in case of connection error
    #[arg(short, long, env = "RETRY_DELAY", default_value_t = DEFAULT_RETRY)]
    pub retry: u64,

    /// Seconds between two thermostat polls
    #[arg(short, long, env = "POLL_INTERVAL", default_value_t = DEFAULT_POLL_INTERVAL)]
    pub interval: u64,

    /// Number of polls between two gateway refreshes
    #[arg(
        long,
        env = "REFRESH_CYCLES",
        default_value_t = DEFAULT_REFRESH_CYCLES,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub refresh_cycles: u32,

    /// Verbose logging. Can be specified twice.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn into_config(self) -> BridgeConfig {
        BridgeConfig {
            username: self.username,
            password: self.password,
            mqtt_server: self.mqtt_server,
            mqtt_port: self.mqtt_port,
            mqtt_username: self.mqtt_username,
            mqtt_password: self.mqtt_password,
            timeout: Duration::from_secs(self.timeout),
            retry: Duration::from_secs(self.retry),
            poll_interval: Duration::from_secs(self.interval),
            refresh_cycles: self.refresh_cycles,
        }
    }
}

#[derive(Clone)]
pub struct BridgeConfig {
    pub username: String,
    pub password: String,
    pub mqtt_server: String,
    pub mqtt_port: u16,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub timeout: Duration,
    pub retry: Duration,
    pub poll_interval: Duration,
    pub refresh_cycles: u32,
}

impl BridgeConfig {
    pub fn new(username: String, password: String) -> Self {
        Self {
            username,
            password,
            mqtt_server: DEFAULT_MQTT_SERVER.to_string(),
            mqtt_port: DEFAULT_MQTT_PORT,
            mqtt_username: None,
            mqtt_password: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            retry: Duration::from_secs(DEFAULT_RETRY),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL),
            refresh_cycles: DEFAULT_REFRESH_CYCLES,
        }
    }

    pub fn mqtt_uri(&self) -> String {
        format!("tcp://{}:{}", self.mqtt_server, self.mqtt_port)
    }
}

pub fn level_filter(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}
