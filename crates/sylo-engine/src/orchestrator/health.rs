use chrono::{SecondsFormat, Utc};
use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use sylo_core::persistence::HealthCheckError;

use super::{elapsed_ms, panic_message, Orchestrator};

/// Overall or per-component health, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandHealth {
    pub total: usize,
    pub enabled: usize,
    pub status: HealthStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistenceHealth {
    pub backend: String,
    pub status: HealthStatus,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthDetails {
    pub commands: CommandHealth,
    pub persistence: PersistenceHealth,
    /// RFC 3339, millisecond precision
    pub timestamp: String,
    /// Seconds since the orchestrator was built
    pub uptime: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub details: HealthDetails,
}

impl Orchestrator {
    /// Check the registry and check the persistence backend
    ///
    /// No enabled commands or a failed check degrade the status; an
    /// unreachable, panicking or hung backend makes it unhealthy. The status
    /// never improves once worsened.
    pub async fn health_check(&self) -> HealthReport {
        let total = self.registry.len();
        let enabled = self.registry.enabled_count();
        let commands = CommandHealth {
            total,
            enabled,
            status: if enabled > 0 {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
        };

        let persistence = self.check_persistence().await;
        let status = HealthStatus::Healthy
            .max(commands.status)
            .max(persistence.status);

        tracing::info!(
            component = module_path!(),
            op = "health_check",
            status = status.as_str(),
            commands_enabled = enabled,
            persistence = persistence.status.as_str(),
            latency_ms = persistence.latency_ms,
        );

        HealthReport {
            status,
            details: HealthDetails {
                commands,
                persistence,
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                uptime: self.started.elapsed().as_secs_f64(),
            },
        }
    }

    async fn check_persistence(&self) -> PersistenceHealth {
        let timeout_ms = self.config.health_check_timeout_ms;
        let started = Instant::now();
        let check = AssertUnwindSafe(self.persistence.check_connection()).catch_unwind();
        let outcome = tokio::time::timeout(Duration::from_millis(timeout_ms), check).await;

        let (status, error) = match outcome {
            Ok(Ok(Ok(()))) => (HealthStatus::Healthy, None),
            Ok(Ok(Err(HealthCheckError::Failed(message)))) => (HealthStatus::Degraded, Some(message)),
            Ok(Ok(Err(HealthCheckError::Unreachable(message)))) => (HealthStatus::Unhealthy, Some(message)),
            Ok(Err(payload)) => (
                HealthStatus::Unhealthy,
                Some(format!("Health check panicked: {}", panic_message(payload.as_ref()))),
            ),
            Err(_) => (
                HealthStatus::Unhealthy,
                Some(format!("Health check timed out after {timeout_ms} ms")),
            ),
        };

        PersistenceHealth {
            backend: self.persistence.name().to_string(),
            status,
            latency_ms: elapsed_ms(started),
            error,
        }
    }
}
