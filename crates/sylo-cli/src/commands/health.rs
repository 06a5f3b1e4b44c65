//! Health report

use anyhow::Result;
use sylo_engine::{HealthStatus, Orchestrator};

use super::print_json;

pub async fn execute(orchestrator: &Orchestrator) -> Result<i32> {
    let report = orchestrator.health_check().await;
    print_json(&report, false)?;
    Ok(match report.status {
        HealthStatus::Healthy => 0,
        HealthStatus::Degraded | HealthStatus::Unhealthy => 1,
    })
}
