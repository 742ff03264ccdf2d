//! Prometheus Metrics Sink
//!
//! Holds every series the exporter publishes in a registry owned by this
//! instance (no process-global registry):
//!
//! - `solax_up` - 1 if the last exchange with the inverter succeeded, else 0
//! - `solax_inverter_info` - serial number, type and firmware version as labels
//!   (value is always 1)
//! - `solax_<sensor>` - one gauge per sensor of the current session's schema
//!
//! Sensor gauges are created when a session's schema is synced and replaced
//! wholesale on the next sync. A gauge joins the registry only once a value has
//! been written to it, so a sensor the inverter never reported is not exported
//! as 0. Gauges are not cleared when a fetch fails, so the last known values
//! stay visible next to `solax_up 0`.

use crate::error::{ExporterError, Result};
use crate::schema::{MetricDefinition, Schema};
use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub const NAMESPACE: &str = "solax";
pub const UP_METRIC: &str = "up";
pub const INFO_METRIC: &str = "inverter_info";

pub struct MetricsSink {
    registry: Registry,
    up: Gauge,
    inverter_info: GaugeVec,
    sensors: BTreeMap<String, Gauge>,
    registered: BTreeSet<String>,
}

impl MetricsSink {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let up = Gauge::with_opts(
            Opts::new(UP_METRIC, "Whether the Solax inverter is reachable").namespace(NAMESPACE),
        )?;
        let inverter_info = GaugeVec::new(
            Opts::new(INFO_METRIC, "Information about the Solax inverter").namespace(NAMESPACE),
            &["serial_number", "type", "version"],
        )?;

        registry.register(Box::new(up.clone()))?;
        registry.register(Box::new(inverter_info.clone()))?;

        Ok(Self {
            registry,
            up,
            inverter_info,
            sensors: BTreeMap::new(),
            registered: BTreeSet::new(),
        })
    }

    pub fn set_liveness(&self, up: bool) {
        self.up.set(if up { 1.0 } else { 0.0 });
    }

    pub fn liveness(&self) -> bool {
        self.up.get() > 0.0
    }

    /// Replace the info record; any previous label set is dropped
    pub fn set_info(&self, serial_number: &str, inverter_type: &str, version: &str) {
        self.inverter_info.reset();
        self.inverter_info
            .with_label_values(&[serial_number, inverter_type, version])
            .set(1.0);
    }

    /// Create the gauge for one sensor. It is registered on its first write.
    pub fn define_metric(&mut self, definition: &MetricDefinition) -> Result<()> {
        if self.sensors.contains_key(&definition.id) {
            return Err(ExporterError::SchemaInconsistency(format!(
                "metric {} is already defined",
                definition.id
            )));
        }

        let gauge = Gauge::with_opts(Opts::new(definition.id.clone(), definition.help.clone()))?;
        self.sensors.insert(definition.id.clone(), gauge);
        Ok(())
    }

    pub fn set_value(&mut self, id: &str, value: f64) -> Result<()> {
        let gauge = self.sensors.get(id).ok_or_else(|| {
            ExporterError::SchemaInconsistency(format!("metric {} is not defined", id))
        })?;
        gauge.set(value);

        if !self.registered.contains(id) {
            self.registry.register(Box::new(gauge.clone()))?;
            self.registered.insert(id.to_string());
        }
        Ok(())
    }

    /// Current value of a sensor, `None` until it has been written
    pub fn value(&self, id: &str) -> Option<f64> {
        if !self.registered.contains(id) {
            return None;
        }
        self.sensors.get(id).map(Gauge::get)
    }

    /// Drop every sensor gauge and the info record
    pub fn clear_sensors(&mut self) {
        let registered = std::mem::take(&mut self.registered);
        for (id, gauge) in std::mem::take(&mut self.sensors) {
            if !registered.contains(&id) {
                continue;
            }
            if let Err(e) = self.registry.unregister(Box::new(gauge)) {
                debug!("Gauge {} was not registered: {}", id, e);
            }
        }
        self.inverter_info.reset();
    }

    /// Swap the sensor gauge set for the one described by `schema`.
    ///
    /// On error the sink is left with no sensor gauges at all.
    pub fn replace_schema(&mut self, schema: &Schema) -> Result<()> {
        self.clear_sensors();

        for definition in schema.definitions() {
            if let Err(e) = self.define_metric(definition) {
                self.clear_sensors();
                return Err(e);
            }
        }

        debug!("Metrics schema replaced with {} sensors", self.sensors.len());
        Ok(())
    }

    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| ExporterError::Server(e.to_string()))
    }
}
