#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{register, user};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use sylo_core::{CommandRegistry, CommandRequest, ErrorCode, FnCommand};
use sylo_engine::{Orchestrator, OrchestratorConfig};
use tokio_util::sync::CancellationToken;

/// A handler that runs until its context token fires
fn cooperative() -> FnCommand {
    FnCommand::new("wait", "Wait for cancellation", |_, ctx| async move {
        tokio::select! {
            _ = ctx.cancellation().cancelled() => Ok(Value::Null),
            _ = tokio::time::sleep(Duration::from_secs(30)) => Ok(json!("finished")),
        }
    })
}

#[tokio::test]
async fn test_caller_cancellation_ends_dispatch() {
    let registry = Arc::new(CommandRegistry::new());
    register(&registry, "wait", cooperative());
    let orchestrator = Orchestrator::builder(registry).build().unwrap();

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let response = orchestrator
        .execute_with_cancellation(&CommandRequest::new("wait"), &user(), token)
        .await;

    assert_eq!(response.error_code(), Some(ErrorCode::ExecutionFailed));
    assert_eq!(response.error().unwrap().message, "Command execution was cancelled");
}

#[tokio::test]
async fn test_already_cancelled_token_skips_handler() {
    let registry = Arc::new(CommandRegistry::new());
    register(
        &registry,
        "quick",
        FnCommand::new("quick", "", |_, _| async { Ok(json!(1)) }),
    );
    let orchestrator = Orchestrator::builder(registry).build().unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let response = orchestrator
        .execute_with_cancellation(&CommandRequest::new("quick"), &user(), token)
        .await;
    assert_eq!(response.error_code(), Some(ErrorCode::ExecutionFailed));
}

#[tokio::test]
async fn test_timeout_cancels_handler_token() {
    let registry = Arc::new(CommandRegistry::new());
    register(&registry, "wait", cooperative());
    let orchestrator = Orchestrator::builder(registry)
        .config(OrchestratorConfig {
            handler_timeout_ms: Some(25),
            ..Default::default()
        })
        .build()
        .unwrap();

    let caller_token = CancellationToken::new();
    let response = orchestrator
        .execute_with_cancellation(&CommandRequest::new("wait"), &user(), caller_token.clone())
        .await;

    assert_eq!(response.error_code(), Some(ErrorCode::ExecutionFailed));
    assert_eq!(
        response.error().unwrap().message,
        "Command execution timed out after 25 ms"
    );
    assert!(!caller_token.is_cancelled(), "timeout must not cancel the caller's token");
}

#[tokio::test]
async fn test_fast_handler_unaffected_by_timeout() {
    let registry = Arc::new(CommandRegistry::new());
    register(
        &registry,
        "quick",
        FnCommand::new("quick", "", |_, _| async { Ok(json!({"ok": true})) }),
    );
    let orchestrator = Orchestrator::builder(registry)
        .config(OrchestratorConfig {
            handler_timeout_ms: Some(1_000),
            ..Default::default()
        })
        .build()
        .unwrap();

    let response = orchestrator.execute(&CommandRequest::new("quick"), &user()).await;
    assert_eq!(response.data(), Some(&json!({"ok": true})));
}
