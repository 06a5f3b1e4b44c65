#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{admin, create_widget, user};
use serde_json::json;
use std::sync::Arc;
use sylo_core::{
    CallerIdentity, CommandCategory, CommandRegistry, CommandRequest, DenyByDefaultPolicy,
    ErrorCode, RegisterOptions, RolePermissionPolicy,
};
use sylo_engine::{Orchestrator, OrchestratorConfig, PolicyKind};

fn gated_registry() -> Arc<CommandRegistry> {
    let registry = Arc::new(CommandRegistry::new());
    registry
        .register(
            "delete_widget",
            create_widget(),
            CommandCategory::Project,
            RegisterOptions::new().permissions(["widget:delete"]),
        )
        .unwrap();
    registry
        .register(
            "create_widget",
            create_widget(),
            CommandCategory::Project,
            RegisterOptions::new(),
        )
        .unwrap();
    registry
}

fn delete_request() -> CommandRequest {
    CommandRequest::new("delete_widget").with_param("name", json!("Chair"))
}

#[tokio::test]
async fn test_deny_by_default_blocks_non_admin() {
    let orchestrator = Orchestrator::builder(gated_registry())
        .policy(Arc::new(DenyByDefaultPolicy))
        .build()
        .unwrap();

    let response = orchestrator.execute(&delete_request(), &user()).await;
    assert_eq!(response.error_code(), Some(ErrorCode::Unauthorized));
    assert_eq!(
        response.error().unwrap().message,
        "Insufficient permissions to execute this command"
    );
}

#[tokio::test]
async fn test_admin_bypasses_policy() {
    let orchestrator = Orchestrator::builder(gated_registry())
        .policy(Arc::new(DenyByDefaultPolicy))
        .build()
        .unwrap();

    let response = orchestrator.execute(&delete_request(), &admin()).await;
    assert!(response.is_success());
}

#[tokio::test]
async fn test_ungated_commands_skip_policy() {
    let orchestrator = Orchestrator::builder(gated_registry())
        .policy(Arc::new(DenyByDefaultPolicy))
        .build()
        .unwrap();

    let response = orchestrator
        .execute(
            &CommandRequest::new("create_widget").with_param("name", json!("Chair")),
            &user(),
        )
        .await;
    assert!(response.is_success());
}

#[tokio::test]
async fn test_permission_checked_before_validation() {
    let orchestrator = Orchestrator::builder(gated_registry())
        .policy(Arc::new(DenyByDefaultPolicy))
        .build()
        .unwrap();

    let response = orchestrator
        .execute(&CommandRequest::new("delete_widget"), &user())
        .await;
    assert_eq!(response.error_code(), Some(ErrorCode::Unauthorized));
}

#[tokio::test]
async fn test_role_policy_from_config() {
    let mut config = OrchestratorConfig {
        permission_policy: PolicyKind::RoleBased,
        ..Default::default()
    };
    config
        .role_grants
        .insert("manager".to_string(), vec!["widget:delete".to_string()]);
    let orchestrator = Orchestrator::builder(gated_registry())
        .config(config)
        .build()
        .unwrap();

    let manager = CallerIdentity::new("m-1").with_role("manager");
    assert!(orchestrator.execute(&delete_request(), &manager).await.is_success());
    assert_eq!(
        orchestrator.execute(&delete_request(), &user()).await.error_code(),
        Some(ErrorCode::Unauthorized)
    );
}

#[tokio::test]
async fn test_available_commands_are_permission_filtered() {
    let registry = gated_registry();
    registry
        .register(
            "archive_widget",
            create_widget(),
            CommandCategory::Project,
            RegisterOptions::new().disabled(),
        )
        .unwrap();
    let orchestrator = Orchestrator::builder(registry)
        .policy(Arc::new(RolePermissionPolicy::new().grant("manager", ["widget:delete"])))
        .build()
        .unwrap();

    let for_user = orchestrator.available_commands(&user()).await;
    assert_eq!(for_user.keys().collect::<Vec<_>>(), vec!["create_widget"]);

    let manager = CallerIdentity::new("m-1").with_role("manager");
    let for_manager = orchestrator.available_commands(&manager).await;
    assert_eq!(
        for_manager.keys().collect::<Vec<_>>(),
        vec!["create_widget", "delete_widget"]
    );
    let summary = &for_manager["delete_widget"];
    assert_eq!(summary.category, CommandCategory::Project);
    assert_eq!(summary.name, "create_widget");
    assert_eq!(summary.parameters[0].name, "name");

    let docs = orchestrator.documentation();
    assert_eq!(docs.len(), 3);
    assert!(!docs["archive_widget"].enabled);
}
