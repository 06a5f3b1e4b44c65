use serde_json::Value;
use std::sync::Arc;
use sylo_core::{CallerIdentity, CommandRegistry, CommandRequest, PermissionPolicy, ResponseEnvelope};
use sylo_engine::Orchestrator;
use sylo_store::MemoryBackend;

#[allow(dead_code)]
pub fn user() -> CallerIdentity {
    CallerIdentity::new("user-1").with_role("user")
}

#[allow(dead_code)]
pub fn admin() -> CallerIdentity {
    CallerIdentity::new("admin-1").with_role("admin")
}

/// An orchestrator with every built-in command over a fresh memory store
#[allow(dead_code)]
pub fn orchestrator() -> Orchestrator {
    orchestrator_builder().build().unwrap()
}

#[allow(dead_code)]
pub fn orchestrator_with_policy(policy: Arc<dyn PermissionPolicy>) -> Orchestrator {
    orchestrator_builder().policy(policy).build().unwrap()
}

fn orchestrator_builder() -> sylo_engine::OrchestratorBuilder {
    let store = Arc::new(MemoryBackend::new());
    let registry = Arc::new(CommandRegistry::new());
    sylo_commands::register_all(&registry, store.clone()).unwrap();
    Orchestrator::builder(registry).persistence(store)
}

#[allow(dead_code)]
pub async fn run(orchestrator: &Orchestrator, action: &str, params: Value) -> ResponseEnvelope {
    let request = CommandRequest::new(action).with_parameters(params);
    orchestrator.execute(&request, &user()).await
}

/// Create a project and return its id
#[allow(dead_code)]
pub async fn seed_project(orchestrator: &Orchestrator, params: Value) -> String {
    let response = run(orchestrator, "create_project", params).await;
    assert!(response.is_success(), "create failed: {:?}", response.error());
    response.data().unwrap()["id"].as_str().unwrap().to_string()
}
