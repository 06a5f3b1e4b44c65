//! Sylo Commands - the built-in command sets
//!
//! Each command is a handler over a shared [`DocumentStore`]. Call
//! [`register_all`] once at startup, before the first dispatch.

pub mod project;
pub mod system;

use std::sync::Arc;
use sylo_core::model::CommandCategory;
use sylo_core::registry::{CommandRegistry, RegisterOptions};
use sylo_store::DocumentStore;

/// Permission required by `delete_project`
pub const PROJECT_DELETE_PERMISSION: &str = "project:delete";

/// Register every built-in command
///
/// # Errors
///
/// Fails with `DuplicateCommand` if any name is already registered.
pub fn register_all(registry: &CommandRegistry, store: Arc<dyn DocumentStore>) -> sylo_core::Result<()> {
    let project = CommandCategory::Project;
    registry.register(
        "create_project",
        project::create_project(store.clone()),
        project,
        RegisterOptions::new(),
    )?;
    registry.register(
        "get_project",
        project::get_project(store.clone()),
        project,
        RegisterOptions::new(),
    )?;
    registry.register(
        "list_projects",
        project::list_projects(store.clone()),
        project,
        RegisterOptions::new(),
    )?;
    registry.register(
        "update_project",
        project::UpdateProject::new(store.clone()),
        project,
        RegisterOptions::new(),
    )?;
    registry.register(
        "delete_project",
        project::delete_project(store),
        project,
        RegisterOptions::new().permissions([PROJECT_DELETE_PERMISSION]),
    )?;
    registry.register("ping", system::Ping, CommandCategory::System, RegisterOptions::new())?;

    for (category, names) in registry.commands_by_category() {
        if !names.is_empty() {
            tracing::info!(
                component = module_path!(),
                op = "register_all",
                category = category.as_str(),
                commands = names.len(),
            );
        }
    }
    Ok(())
}
