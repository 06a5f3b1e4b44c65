use serde::Serialize;
use std::collections::BTreeMap;
use sylo_core::model::{CallerIdentity, CommandCategory, ParameterSchema};
use sylo_core::registry::CommandDoc;

use super::Orchestrator;

/// What a caller needs to know to invoke a command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandSummary {
    pub name: String,
    pub description: String,
    pub category: CommandCategory,
    pub parameters: Vec<ParameterSchema>,
}

impl Orchestrator {
    /// Enabled commands `identity` is allowed to invoke
    pub async fn available_commands(&self, identity: &CallerIdentity) -> BTreeMap<String, CommandSummary> {
        let mut available = BTreeMap::new();
        for (name, entry) in self.registry.get_enabled() {
            if !entry.permissions().is_empty() && !self.is_permitted(identity, entry.permissions()).await {
                continue;
            }
            let handler = entry.handler();
            available.insert(
                name,
                CommandSummary {
                    name: handler.name().to_string(),
                    description: handler.description().to_string(),
                    category: entry.category(),
                    parameters: handler.parameters().to_vec(),
                },
            );
        }
        available
    }

    /// Every registered command, disabled ones included
    pub fn documentation(&self) -> BTreeMap<String, CommandDoc> {
        self.registry.get_documentation()
    }
}
