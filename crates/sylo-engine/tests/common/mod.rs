use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use sylo_core::{
    CallerIdentity, CommandCategory, CommandRegistry, FnCommand, ParameterSchema,
    PersistenceBackend, HealthCheckError, RegisterOptions,
};
use sylo_engine::Orchestrator;

#[allow(dead_code)]
pub fn user() -> CallerIdentity {
    CallerIdentity::new("user-1").with_role("user")
}

#[allow(dead_code)]
pub fn admin() -> CallerIdentity {
    CallerIdentity::new("admin-1").with_role("admin")
}

/// `create_widget` echoes its parameters back
#[allow(dead_code)]
pub fn create_widget() -> FnCommand {
    FnCommand::new("create_widget", "Create a widget", |params, _ctx| async move {
        Ok(Value::Object(params))
    })
    .param(ParameterSchema::string("name").required().describe("Widget name"))
}

/// A command that sleeps `delay_ms` then returns `{"tag": tag}`
#[allow(dead_code)]
pub fn delayed(tag: &'static str, delay_ms: u64) -> FnCommand {
    FnCommand::new(tag, "Sleep then answer", move |_params, _ctx| async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok(json!({ "tag": tag }))
    })
}

#[allow(dead_code)]
pub fn failing(name: &'static str, message: &'static str) -> FnCommand {
    FnCommand::new(name, "Always fails", move |_params, _ctx| async move {
        Err(anyhow::anyhow!(message))
    })
}

#[allow(dead_code)]
pub fn register(registry: &CommandRegistry, name: &str, cmd: FnCommand) {
    registry
        .register(name, cmd, CommandCategory::Project, RegisterOptions::new())
        .unwrap();
}

#[allow(dead_code)]
pub fn widget_orchestrator() -> Orchestrator {
    let registry = Arc::new(CommandRegistry::new());
    register(&registry, "create_widget", create_widget());
    Orchestrator::builder(registry).build().unwrap()
}

#[allow(dead_code)]
pub fn bag(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// How a scripted backend answers health checks
#[allow(dead_code)]
#[derive(Clone, Copy)]
pub enum HealthScript {
    Ok,
    Fails,
    Unreachable,
    Panics,
    Hangs,
}

pub struct ScriptedBackend {
    pub script: HealthScript,
}

#[async_trait]
impl PersistenceBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn check_connection(&self) -> Result<(), HealthCheckError> {
        match self.script {
            HealthScript::Ok => Ok(()),
            HealthScript::Fails => Err(HealthCheckError::Failed("relation does not exist".to_string())),
            HealthScript::Unreachable => Err(HealthCheckError::Unreachable("connection refused".to_string())),
            HealthScript::Panics => panic!("check exploded"),
            HealthScript::Hangs => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
