//! Metrics registry and the service's instruments.
//!
//! `MetricsRegistry` namespaces every instrument and refuses duplicate names,
//! so a wiring mistake fails at startup instead of silently shadowing a series.
//! `DeviceMetrics` owns the four instruments the service publishes.

use std::time::Duration;

use prometheus::{
    Encoder, Gauge, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry,
    TextEncoder,
};

use fleetwatch_core::error::{FleetError, Result};

/// Upper bounds (seconds) of the request duration histogram.
pub const REQUEST_DURATION_BUCKETS: [f64; 4] = [0.1, 0.15, 0.2, 0.3];

/// Device type label used for firmware upgrades.
pub const UPGRADE_TYPE_ROUTER: &str = "router";

pub struct MetricsRegistry {
    namespace: String,
    registry: Registry,
}

impl MetricsRegistry {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            registry: Registry::new(),
        }
    }

    pub fn register_gauge(&self, name: &str, help: &str) -> Result<Gauge> {
        let gauge = Gauge::with_opts(self.opts(name, help)).map_err(|e| reg_err(name, e))?;
        self.register(name, Box::new(gauge.clone()))?;
        Ok(gauge)
    }

    pub fn register_gauge_vec(&self, name: &str, help: &str, labels: &[&str]) -> Result<GaugeVec> {
        let gauge = GaugeVec::new(self.opts(name, help), labels).map_err(|e| reg_err(name, e))?;
        self.register(name, Box::new(gauge.clone()))?;
        Ok(gauge)
    }

    pub fn register_counter_vec(
        &self,
        name: &str,
        help: &str,
        labels: &[&str],
    ) -> Result<IntCounterVec> {
        let counter =
            IntCounterVec::new(self.opts(name, help), labels).map_err(|e| reg_err(name, e))?;
        self.register(name, Box::new(counter.clone()))?;
        Ok(counter)
    }

    pub fn register_histogram_vec(
        &self,
        name: &str,
        help: &str,
        labels: &[&str],
        buckets: &[f64],
    ) -> Result<HistogramVec> {
        let opts = HistogramOpts::new(name, help)
            .namespace(self.namespace.as_str())
            .buckets(buckets.to_vec());
        let hist = HistogramVec::new(opts, labels).map_err(|e| reg_err(name, e))?;
        self.register(name, Box::new(hist.clone()))?;
        Ok(hist)
    }

    /// Render current values in Prometheus text exposition format.
    pub fn render(&self) -> Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buf)
            .map_err(|e| FleetError::Internal(format!("metrics encode failed: {e}")))?;
        String::from_utf8(buf)
            .map_err(|e| FleetError::Internal(format!("metrics output not utf-8: {e}")))
    }

    fn opts(&self, name: &str, help: &str) -> Opts {
        Opts::new(name, help).namespace(self.namespace.as_str())
    }

    fn register(&self, name: &str, c: Box<dyn prometheus::core::Collector>) -> Result<()> {
        self.registry.register(c).map_err(|e| reg_err(name, e))
    }
}

fn reg_err(name: &str, e: prometheus::Error) -> FleetError {
    FleetError::Internal(format!("metric registration failed ({name}): {e}"))
}

/// Instruments published by the service.
///
/// Series names, with the default `myapp` namespace:
/// - `myapp_devices` : device count, set once at startup
/// - `myapp_info{version}` : running build, always 1
/// - `myapp_device_upgrade_total{type}` : accepted firmware updates
/// - `myapp_request_duration_seconds{status,method}` : listing latency
///
/// The count and info gauges keep the original service's short names rather
/// than `devices_total` / `app_info`, so existing dashboards keep working.
pub struct DeviceMetrics {
    devices: Gauge,
    info: GaugeVec,
    upgrades: IntCounterVec,
    duration: HistogramVec,
}

impl DeviceMetrics {
    pub fn register(reg: &MetricsRegistry) -> Result<Self> {
        Ok(Self {
            devices: reg.register_gauge("devices", "all devices")?,
            info: reg.register_gauge_vec("info", "app env info", &["version"])?,
            upgrades: reg.register_counter_vec(
                "device_upgrade_total",
                "Number of upgraded devices",
                &["type"],
            )?,
            duration: reg.register_histogram_vec(
                "request_duration_seconds",
                "request duration",
                &["status", "method"],
                &REQUEST_DURATION_BUCKETS,
            )?,
        })
    }

    pub fn set_device_count(&self, n: usize) {
        self.devices.set(n as f64);
    }

    /// Mark `version` as the running build (one-hot, value 1).
    pub fn set_app_info(&self, version: &str) {
        match self.info.get_metric_with_label_values(&[version]) {
            Ok(g) => g.set(1.0),
            Err(e) => tracing::warn!(error = %e, "info gauge update failed"),
        }
    }

    pub fn record_upgrade(&self, device_type: &str) {
        match self.upgrades.get_metric_with_label_values(&[device_type]) {
            Ok(c) => c.inc(),
            Err(e) => tracing::warn!(error = %e, "upgrade counter update failed"),
        }
    }

    pub fn upgrade_count(&self, device_type: &str) -> u64 {
        self.upgrades
            .get_metric_with_label_values(&[device_type])
            .map(|c| c.get())
            .unwrap_or(0)
    }

    pub fn observe_request(&self, method: &str, status: u16, elapsed: Duration) {
        let status = status.to_string();
        match self
            .duration
            .get_metric_with_label_values(&[status.as_str(), method])
        {
            Ok(h) => h.observe(elapsed.as_secs_f64()),
            Err(e) => tracing::warn!(error = %e, "duration histogram update failed"),
        }
    }
}
