//! The one enumeration of command categories
//!
//! Registration, category filtering and documentation all use this type, so
//! a category cannot exist in one place and be missing from another.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandCategory {
    Project,
    Task,
    Material,
    Mcp,
    Ai,
    Workflow,
    Analytics,
    System,
}

impl CommandCategory {
    pub const ALL: [CommandCategory; 8] = [
        CommandCategory::Project,
        CommandCategory::Task,
        CommandCategory::Material,
        CommandCategory::Mcp,
        CommandCategory::Ai,
        CommandCategory::Workflow,
        CommandCategory::Analytics,
        CommandCategory::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandCategory::Project => "project",
            CommandCategory::Task => "task",
            CommandCategory::Material => "material",
            CommandCategory::Mcp => "mcp",
            CommandCategory::Ai => "ai",
            CommandCategory::Workflow => "workflow",
            CommandCategory::Analytics => "analytics",
            CommandCategory::System => "system",
        }
    }
}

impl fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown command category: {s}"))
    }
}
