use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub admin: AdminSettings,
    pub probe: ProbeSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminSettings {
    pub host: String,
    pub port: u16,
    pub operator_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProbeSettings {
    /// Master switch: when false, no tagging happens and probe runs are
    /// refused
    pub enabled: bool,
    /// Default number of concurrent submissions per run
    pub request_count: u32,
    /// Independent per-request deadline
    pub request_timeout_secs: u64,
    /// Checkout submission endpoint of the target system
    pub checkout_url: String,
    /// Whether the target claims its serialization fix is active; owned by
    /// the external locking component and used for reporting only
    pub fix_enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("admin.host", "0.0.0.0")?
            .set_default("admin.port", 8080)?
            .set_default("admin.operator_token", "dev-operator-token")?
            .set_default("probe.enabled", false)?
            .set_default("probe.request_count", 5)?
            .set_default("probe.request_timeout_secs", 15)?
            .set_default("probe.checkout_url", "http://localhost:8000/?wc-ajax=checkout")?
            .set_default("probe.fix_enabled", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            // Add configuration file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{environment}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix
            .add_source(Environment::with_prefix("CHECKOUT_PROBE").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.admin.host, self.admin.port)
    }
}
