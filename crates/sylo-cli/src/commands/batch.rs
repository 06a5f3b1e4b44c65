//! Dispatch a JSON array of commands

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use sylo_engine::Orchestrator;

use super::{print_json, read_input};
use crate::app::IdentityArgs;
use crate::transport;

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// JSON array of wire requests; reads stdin when omitted or `-`
    pub requests: Option<String>,

    #[arg(long, conflicts_with = "requests")]
    pub file: Option<PathBuf>,

    /// Run every command concurrently instead of stopping at the first failure
    #[arg(long)]
    pub parallel: bool,

    #[arg(long)]
    pub compact: bool,
}

pub async fn execute(args: BatchArgs, orchestrator: &Orchestrator, identity: &IdentityArgs) -> Result<i32> {
    let raw = read_input(args.requests, args.file.as_ref())?;

    let envelopes = match transport::parse_batch(&raw) {
        Ok(requests) if args.parallel => {
            orchestrator
                .execute_parallel(&requests, &identity.identity())
                .await
        }
        Ok(requests) => {
            orchestrator
                .execute_sequence(&requests, &identity.identity())
                .await
        }
        Err(err) => vec![transport::rejection(err, None)],
    };

    print_json(&envelopes, args.compact)?;
    Ok(transport::batch_exit_code(&envelopes))
}
