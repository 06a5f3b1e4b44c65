//! Dispatch a single command

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use sylo_engine::Orchestrator;

use super::{interrupt_token, print_json, read_input};
use crate::app::IdentityArgs;
use crate::transport;

#[derive(Debug, Args)]
pub struct ExecArgs {
    /// Wire request as JSON; reads stdin when omitted or `-`
    pub request: Option<String>,

    #[arg(long, conflicts_with = "request")]
    pub file: Option<PathBuf>,

    /// Print the envelope on one line
    #[arg(long)]
    pub compact: bool,
}

pub async fn execute(args: ExecArgs, orchestrator: &Orchestrator, identity: &IdentityArgs) -> Result<i32> {
    let raw = read_input(args.request, args.file.as_ref())?;

    let envelope = match transport::parse_request(&raw) {
        Ok(request) => {
            orchestrator
                .execute_with_cancellation(&request, &identity.identity(), interrupt_token())
                .await
        }
        Err(err) => transport::rejection(err, None),
    };

    print_json(&envelope, args.compact)?;
    Ok(transport::exit_code(&envelope))
}
