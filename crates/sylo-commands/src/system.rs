//! System commands

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use sylo_core::handler::{CommandContext, CommandHandler};
use sylo_core::model::ParameterSchema;

/// Liveness check through the full dispatch pipeline
pub struct Ping;

#[async_trait]
impl CommandHandler for Ping {
    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "Check that commands are being dispatched"
    }

    fn parameters(&self) -> &[ParameterSchema] {
        &[]
    }

    async fn execute(&self, _parameters: &Map<String, Value>, ctx: &CommandContext) -> anyhow::Result<Value> {
        Ok(json!({
            "pong": true,
            "requestId": ctx.request_id(),
            "timestamp": ctx.timestamp().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "backend": ctx.persistence().name(),
        }))
    }
}
