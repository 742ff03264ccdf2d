//! Metric Schema Registry
//!
//! Turns a session's [`SensorCatalog`] into the set of gauges the exporter
//! publishes. Identifiers are derived from raw sensor names with [`sanitize`]:
//!
//! | Raw name          | Identifier              |
//! |-------------------|-------------------------|
//! | `Battery Power`   | `solax_battery_power`   |
//! | `PV1 Current`     | `solax_pv1_current`     |
//! | `Today's Yield`   | `solax_todays_yield`    |
//! | `Total Feed-in`   | `solax_total_feed_in`   |

use crate::error::{ExporterError, Result};
use crate::metrics::{INFO_METRIC, NAMESPACE, UP_METRIC};
use crate::source::SensorCatalog;
use std::collections::HashMap;

/// One exported gauge derived from a catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDefinition {
    pub id: String,
    pub raw_name: String,
    pub unit: String,
    pub help: String,
}

impl MetricDefinition {
    pub fn new(raw_name: &str, unit: &str) -> Self {
        let id = sanitize(raw_name);
        // Prometheus refuses empty help strings
        let help = match (raw_name.is_empty(), unit.is_empty()) {
            (true, _) => id.clone(),
            (false, true) => raw_name.to_string(),
            (false, false) => format!("{} in {}", raw_name, unit),
        };

        Self {
            id,
            raw_name: raw_name.to_string(),
            unit: unit.to_string(),
            help,
        }
    }
}

/// Derive a stable metric identifier from a raw sensor name.
///
/// Lowercases, drops apostrophes, maps spaces and hyphens to underscores and
/// adds the `solax_` prefix. Anything else outside `[a-z0-9_]` also becomes an
/// underscore so the result is always a legal Prometheus metric name.
pub fn sanitize(raw_name: &str) -> String {
    let mut id = String::with_capacity(NAMESPACE.len() + 1 + raw_name.len());
    id.push_str(NAMESPACE);
    id.push('_');

    for c in raw_name.to_lowercase().chars() {
        match c {
            '\'' => {}
            'a'..='z' | '0'..='9' | '_' => id.push(c),
            _ => id.push('_'),
        }
    }

    id
}

/// The synced metric set of one session, in catalog order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    definitions: Vec<MetricDefinition>,
    by_name: HashMap<String, usize>,
}

impl Schema {
    /// Definition for a raw sensor name, if the session reported it
    pub fn definition(&self, raw_name: &str) -> Option<&MetricDefinition> {
        self.by_name.get(raw_name).map(|&i| &self.definitions[i])
    }

    pub fn definitions(&self) -> &[MetricDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Build the metric set for a freshly discovered session.
///
/// Fails with [`ExporterError::SchemaInconsistency`] when two raw names map
/// to the same identifier, or a sensor would shadow one of the exporter's
/// own series.
pub fn sync_schema(catalog: &SensorCatalog) -> Result<Schema> {
    let reserved = [
        format!("{}_{}", NAMESPACE, UP_METRIC),
        format!("{}_{}", NAMESPACE, INFO_METRIC),
    ];

    let mut schema = Schema::default();
    let mut owners: HashMap<String, String> = HashMap::new();

    for (raw_name, unit) in catalog.iter() {
        let definition = MetricDefinition::new(raw_name, unit);

        if reserved.contains(&definition.id) {
            return Err(ExporterError::SchemaInconsistency(format!(
                "sensor '{}' maps to reserved metric {}",
                raw_name, definition.id
            )));
        }

        if let Some(previous) = owners.insert(definition.id.clone(), raw_name.to_string()) {
            return Err(ExporterError::SchemaInconsistency(format!(
                "sensors '{}' and '{}' both map to {}",
                previous, raw_name, definition.id
            )));
        }

        schema
            .by_name
            .insert(raw_name.to_string(), schema.definitions.len());
        schema.definitions.push(definition);
    }

    Ok(schema)
}
