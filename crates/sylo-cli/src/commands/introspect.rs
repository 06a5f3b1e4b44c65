//! Command listing and documentation

use anyhow::Result;
use clap::Args;
use sylo_core::model::CommandCategory;
use sylo_engine::Orchestrator;

use super::print_json;
use crate::app::IdentityArgs;

#[derive(Debug, Args)]
pub struct CommandsArgs {
    /// Only list commands in this category
    #[arg(long)]
    pub category: Option<CommandCategory>,

    /// Print the full summaries as JSON instead of one name per line
    #[arg(long)]
    pub json: bool,
}

/// Commands the caller may invoke
pub async fn commands(args: CommandsArgs, orchestrator: &Orchestrator, identity: &IdentityArgs) -> Result<i32> {
    let mut available = orchestrator.available_commands(&identity.identity()).await;
    if let Some(category) = args.category {
        available.retain(|_, summary| summary.category == category);
    }

    if args.json {
        print_json(&available, false)?;
    } else {
        for summary in available.values() {
            println!("{:<16} {:<10} {}", summary.name, summary.category.as_str(), summary.description);
        }
    }
    Ok(0)
}

/// Documentation for every registered command
pub fn docs(orchestrator: &Orchestrator) -> Result<i32> {
    print_json(&orchestrator.documentation(), false)?;
    Ok(0)
}
