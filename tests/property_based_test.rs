//! Property-based tests using proptest
//!
//! Tests that verify properties hold for arbitrary inputs.

use proptest::prelude::*;
use solax_exporter::metrics::MetricsSink;
use solax_exporter::schema::{sanitize, sync_schema, MetricDefinition};
use solax_exporter::source::SensorCatalog;

/// Helper to create a test metrics instance
fn create_test_sink() -> MetricsSink {
    MetricsSink::new().expect("Failed to create metrics sink")
}

proptest! {
    #[test]
    fn test_sanitize_is_deterministic(name in "\\PC*") {
        // Given: Any raw sensor name
        // When: Sanitizing it twice
        // Then: Both results are identical
        prop_assert_eq!(sanitize(&name), sanitize(&name));
    }

    #[test]
    fn test_sanitize_yields_valid_metric_name(name in "\\PC*") {
        // Given: Any raw sensor name
        // When: Sanitizing it
        let id = sanitize(&name);

        // Then: The result is prefixed and uses only Prometheus-safe characters
        prop_assert!(id.starts_with("solax_"));
        prop_assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
    }

    #[test]
    fn test_sanitize_ignores_apostrophes_and_case(name in "[A-Za-z0-9 ]{1,30}") {
        // Given: A name and a variant with apostrophes and different case
        let variant = format!("{}'", name.to_uppercase());

        // Then: Both sanitize identically
        prop_assert_eq!(sanitize(&name), sanitize(&variant));
    }

    #[test]
    fn test_any_sensor_name_registers_and_renders(name in "\\PC{1,40}") {
        // Given: A sink and a definition derived from an arbitrary name
        let mut sink = create_test_sink();
        let def = MetricDefinition::new(&name, "W");
        prop_assume!(def.id != "solax_up" && def.id != "solax_inverter_info");

        // When: Registering and setting it
        let defined = sink.define_metric(&def);

        // Then: Registration succeeds and rendering does not panic
        prop_assert!(defined.is_ok());
        prop_assert!(sink.set_value(&def.id, 1.0).is_ok());
        prop_assert!(sink.render().is_ok());
    }

    #[test]
    fn test_any_gauge_value(value in -1e18..1e18) {
        // Given: A sink with one sensor
        let mut sink = create_test_sink();
        let catalog: SensorCatalog = [("Battery Power", "W")].into_iter().collect();
        sink.replace_schema(&sync_schema(&catalog).unwrap()).unwrap();

        // When: Setting any value
        sink.set_value("solax_battery_power", value).unwrap();

        // Then: The value reads back unchanged and renders
        prop_assert_eq!(sink.value("solax_battery_power"), Some(value));
        prop_assert!(sink.render().is_ok());
    }

    #[test]
    fn test_synced_schema_has_unique_ids(
        names in proptest::collection::btree_set("[A-Za-z0-9 '-]{1,20}", 1..10)
    ) {
        // Given: A catalog of arbitrary distinct names
        let catalog: SensorCatalog = names.iter().map(|n| (n.as_str(), "V")).collect();

        // When: Syncing
        // Then: Either every id is unique, or the collision was reported
        if let Ok(schema) = sync_schema(&catalog) {
            let mut ids: Vec<_> = schema.definitions().iter().map(|d| d.id.clone()).collect();
            let total = ids.len();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), total);
            prop_assert_eq!(total, names.len());
        }
    }

    #[test]
    fn test_any_info_labels_render(serial in "\\PC*", version in "\\PC*") {
        // Given: Arbitrary identity strings
        let sink = create_test_sink();

        // When: Recording them
        sink.set_info(&serial, "15", &version);

        // Then: Rendering should not panic
        prop_assert!(sink.render().is_ok());
    }
}
