#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{bag, registry_with_widget, widget_command};
use serde_json::json;
use std::sync::Arc;
use std::thread;
use sylo_core::{CommandCategory, CommandRegistry, RegisterOptions};

#[test]
fn test_widget_accepts_well_formed_input() {
    let registry = registry_with_widget();
    let result = registry.validate_parameters(
        "create_widget",
        &bag(json!({"name": "Chair", "quantity": 3, "priority": "high"})),
    );
    assert!(result.valid, "unexpected errors: {:?}", result.errors);
}

#[test]
fn test_widget_reports_every_violation() {
    let registry = registry_with_widget();
    let result = registry.validate_parameters(
        "create_widget",
        &bag(json!({"quantity": -1, "priority": "urgent"})),
    );
    assert!(!result.valid);
    assert_eq!(
        result.errors,
        vec![
            "Missing required parameter: name",
            "Parameter 'quantity' must be at least 0",
            "Parameter 'priority' must be one of: low, medium, high",
        ]
    );
}

#[test]
fn test_concurrent_readers_during_registration() {
    let registry = Arc::new(CommandRegistry::new());

    let writer = {
        let registry = registry.clone();
        thread::spawn(move || {
            for i in 0..50 {
                registry
                    .register(
                        format!("cmd_{i}"),
                        widget_command(),
                        CommandCategory::Task,
                        RegisterOptions::new(),
                    )
                    .unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    for (name, entry) in registry.get_all() {
                        assert_eq!(entry.name(), name);
                        assert_eq!(entry.handler().parameters().len(), 3);
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(registry.len(), 50);
}

#[test]
fn test_toggle_is_visible_through_existing_snapshot_entries() {
    let registry = registry_with_widget();
    let entry = registry.get("create_widget").unwrap();
    assert!(entry.is_enabled());

    registry.set_enabled("create_widget", false);
    assert!(!entry.is_enabled());
    assert!(registry.get_enabled().is_empty());
    assert_eq!(registry.get_all().len(), 1);
}
