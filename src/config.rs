use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Config {
    #[validate(nested)]
    pub server: ServerConfig,
    #[validate(nested)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            enable_cors: false,
            cors_origin: "http://localhost:3000".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SimulationConfig {
    /// Seed for variation noise; unset draws from entropy
    pub random_seed: Option<u64>,
    #[validate(nested)]
    pub classroom_park: ClassroomParkConfig,
    #[validate(nested)]
    pub daily: DailyEnvironmentsConfig,
}

/// Thirty minute classroom/park comparison with spike support
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClassroomParkConfig {
    #[validate(range(exclusive_min = 0.0))]
    pub duration_secs: f64,
    /// Simulated seconds per real second
    #[validate(range(exclusive_min = 0.0))]
    pub speed: f64,
    #[validate(range(min = 1, max = 240))]
    pub frames_per_second: u32,
    #[validate(range(exclusive_min = 0.0))]
    pub sample_interval_secs: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub baseline_ppm: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub classroom_target_ppm: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub park_target_ppm: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub spike_duration_secs: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub spike_peak_ppm: f64,
}

impl Default for ClassroomParkConfig {
    fn default() -> Self {
        Self {
            duration_secs: 30.0 * 60.0,
            speed: 60.0,
            frames_per_second: 60,
            sample_interval_secs: 60.0,
            baseline_ppm: 460.0,
            classroom_target_ppm: 700.0,
            park_target_ppm: 430.0,
            spike_duration_secs: 120.0,
            spike_peak_ppm: 900.0,
        }
    }
}

/// Full day across four environments, one simulated hour per tick
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DailyEnvironmentsConfig {
    #[validate(range(min = 1.0, max = 24.0))]
    pub hours: f64,
    #[validate(range(min = 1))]
    pub tick_period_ms: u64,
    /// Relative noise, 0.05 means ±5 %
    #[validate(range(min = 0.0, max = 0.5))]
    pub variation_spread: f64,
}

impl Default for DailyEnvironmentsConfig {
    fn default() -> Self {
        Self {
            hours: 24.0,
            tick_period_ms: 800,
            variation_spread: 0.05,
        }
    }
}

impl Config {
    /// Defaults, then `config/default.toml`, then `CO2SIM__` environment variables
    pub fn load() -> Result<Self> {
        let cfg: Config = Self::figment().extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("CO2SIM__").split("__"))
    }
}
