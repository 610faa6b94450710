use std::net::SocketAddr;

use fleetwatch_core::device::{default_seed, Device};
use fleetwatch_core::error::{FleetError, Result};
use serde::Deserialize;

use crate::store::validate_seed;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub version: u32,

    #[serde(default)]
    pub app: AppSection,

    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default = "default_seed")]
    pub devices: Vec<Device>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            version: 1,
            app: AppSection::default(),
            api: ApiSection::default(),
            metrics: MetricsSection::default(),
            devices: default_seed(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(FleetError::UnsupportedVersion);
        }

        self.app.validate()?;
        let api = self.api.validate()?;
        let metrics = self.metrics.validate()?;
        if api == metrics {
            return Err(FleetError::BadRequest(
                "api.listen and metrics.listen must differ".into(),
            ));
        }

        validate_seed(&self.devices)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppSection {
    /// Build version published through the info gauge.
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            version: default_app_version(),
        }
    }
}

impl AppSection {
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(FleetError::BadRequest("app.version must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    #[serde(default = "default_api_listen")]
    pub listen: String,

    /// Pacing delay applied before answering a device listing. 0 disables it.
    #[serde(default)]
    pub list_delay_micros: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            listen: default_api_listen(),
            list_delay_micros: 0,
        }
    }
}

impl ApiSection {
    /// Validate and return the parsed listen address.
    pub fn validate(&self) -> Result<SocketAddr> {
        if self.list_delay_micros > 1_000_000 {
            return Err(FleetError::BadRequest(
                "api.list_delay_micros must be between 0 and 1000000".into(),
            ));
        }
        parse_listen("api.listen", &self.listen)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_metrics_listen")]
    pub listen: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            listen: default_metrics_listen(),
            namespace: default_namespace(),
        }
    }
}

impl MetricsSection {
    /// Validate and return the parsed listen address.
    pub fn validate(&self) -> Result<SocketAddr> {
        let ns = self.namespace.as_str();
        let valid = ns
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && ns.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(FleetError::BadRequest(
                "metrics.namespace must match [A-Za-z_][A-Za-z0-9_]*".into(),
            ));
        }
        parse_listen("metrics.listen", &self.listen)
    }
}

fn parse_listen(field: &str, raw: &str) -> Result<SocketAddr> {
    raw.parse()
        .map_err(|e| FleetError::BadRequest(format!("{field} must be a valid SocketAddr: {e}")))
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").into()
}
fn default_api_listen() -> String {
    "0.0.0.0:3001".into()
}
fn default_metrics_listen() -> String {
    "0.0.0.0:8001".into()
}
fn default_namespace() -> String {
    "myapp".into()
}
