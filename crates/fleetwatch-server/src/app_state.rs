//! Shared application state for the fleetwatch server.
//!
//! Owns the device store, the metrics registry, and the service's
//! instruments. Both listeners receive a clone; nothing is a global.

use std::sync::Arc;
use std::time::Duration;

use fleetwatch_core::error::Result;

use crate::config::ServiceConfig;
use crate::obs::metrics::{DeviceMetrics, MetricsRegistry};
use crate::store::{DeviceStore, InMemoryDeviceStore};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    store: Arc<dyn DeviceStore>,
}

struct AppStateInner {
    cfg: ServiceConfig,
    registry: MetricsRegistry,
    metrics: DeviceMetrics,
}

impl AppState {
    /// Build application state from a validated config.
    ///
    /// Registers the instruments, seeds the store, and publishes the
    /// startup gauges. Duplicate metric names and bad seed data are errors.
    pub async fn new(cfg: ServiceConfig) -> Result<Self> {
        let store: Arc<dyn DeviceStore> = Arc::new(InMemoryDeviceStore::new(cfg.devices.clone())?);
        let registry = MetricsRegistry::new(cfg.metrics.namespace.clone());
        let metrics = DeviceMetrics::register(&registry)?;

        // Only set here: nothing adds or removes devices after startup.
        let count = store.count().await;
        metrics.set_device_count(count);
        metrics.set_app_info(&cfg.app.version);

        tracing::debug!(devices = count, version = %cfg.app.version, "app state ready");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                metrics,
            }),
            store,
        })
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.inner.cfg
    }

    pub fn store(&self) -> Arc<dyn DeviceStore> {
        Arc::clone(&self.store)
    }

    pub fn metrics(&self) -> &DeviceMetrics {
        &self.inner.metrics
    }

    pub fn registry(&self) -> &MetricsRegistry {
        &self.inner.registry
    }

    pub fn list_delay(&self) -> Option<Duration> {
        match self.inner.cfg.api.list_delay_micros {
            0 => None,
            us => Some(Duration::from_micros(us)),
        }
    }
}
