use serde_json::{Map, Value};
use sylo_core::{CommandCategory, CommandRegistry, FnCommand, ParameterSchema, RegisterOptions};

/// Turn a `json!` object into a parameter bag
#[allow(dead_code)]
pub fn bag(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// A `create_widget` command with a name/quantity/priority schema
#[allow(dead_code)]
pub fn widget_command() -> FnCommand {
    FnCommand::new("create_widget", "Create a widget", |params, _ctx| async move {
        Ok(Value::Object(params))
    })
    .param(ParameterSchema::string("name").required().min(1.0).max(100.0))
    .param(ParameterSchema::number("quantity").min(0.0))
    .param(ParameterSchema::string("priority").one_of(["low", "medium", "high"]))
}

#[allow(dead_code)]
pub fn registry_with_widget() -> CommandRegistry {
    let registry = CommandRegistry::new();
    registry
        .register(
            "create_widget",
            widget_command(),
            CommandCategory::Project,
            RegisterOptions::new(),
        )
        .unwrap();
    registry
}
