//! Command registry
//!
//! Maps command names to handlers plus per-command metadata (category,
//! enabled flag, required permissions). The registry is populated at startup
//! and read concurrently by every dispatch; readers never observe a partially
//! registered entry.
//!
//! Snapshots (`get_all`, `get_enabled`, `get_by_category`) are copies. Entries
//! inside them are shared, but their enabled flag can only be changed through
//! [`CommandRegistry::set_enabled`].

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::errors::{Result, SyloError};
use crate::handler::CommandHandler;
use crate::model::{CommandCategory, ParameterSchema};
use crate::rules::validation::{validate_parameters, ValidationResult};

/// Options accepted by [`CommandRegistry::register`]
#[derive(Debug, Clone)]
pub struct RegisterOptions {
    pub enabled: bool,
    pub permissions: Vec<String>,
    /// Overwrite an existing registration instead of failing
    pub replace: bool,
}

impl Default for RegisterOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            permissions: Vec::new(),
            replace: false,
        }
    }
}

impl RegisterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn replace(mut self) -> Self {
        self.replace = true;
        self
    }
}

/// A registered command
pub struct RegistryEntry {
    name: String,
    handler: Arc<dyn CommandHandler>,
    category: CommandCategory,
    enabled: AtomicBool,
    permissions: Vec<String>,
}

impl RegistryEntry {
    /// Registered name (may differ from the handler's own name)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }

    pub fn category(&self) -> CommandCategory {
        self.category
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Permissions the caller must hold; empty means unrestricted
    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    /// Run the declarative schema, then the handler's custom check
    ///
    /// The custom check only runs when the declarative pass produced no
    /// errors, so it may assume every field has its declared type.
    pub fn validate(&self, parameters: &Map<String, Value>) -> ValidationResult {
        let declarative = validate_parameters(self.handler.parameters(), parameters);
        if !declarative.valid {
            return declarative;
        }
        declarative.merge(self.handler.validate(parameters))
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("enabled", &self.is_enabled())
            .field("permissions", &self.permissions)
            .finish()
    }
}

/// Exported documentation for one command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandDoc {
    pub name: String,
    pub description: String,
    pub category: CommandCategory,
    pub enabled: bool,
    pub parameters: Vec<ParameterSchema>,
    pub permissions: Vec<String>,
}

impl From<&RegistryEntry> for CommandDoc {
    fn from(entry: &RegistryEntry) -> Self {
        Self {
            name: entry.handler.name().to_string(),
            description: entry.handler.description().to_string(),
            category: entry.category,
            enabled: entry.is_enabled(),
            parameters: entry.handler.parameters().to_vec(),
            permissions: entry.permissions.clone(),
        }
    }
}

#[derive(Default)]
pub struct CommandRegistry {
    entries: RwLock<HashMap<String, Arc<RegistryEntry>>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Writers only ever insert whole entries; a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<RegistryEntry>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<RegistryEntry>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a handler under `name`
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCommand` when `name` is taken and `options.replace`
    /// is not set.
    pub fn register<H>(
        &self,
        name: impl Into<String>,
        handler: H,
        category: CommandCategory,
        options: RegisterOptions,
    ) -> Result<()>
    where
        H: CommandHandler + 'static,
    {
        self.register_arc(name, Arc::new(handler), category, options)
    }

    /// Register a shared handler under `name`
    ///
    /// # Errors
    ///
    /// Same as [`CommandRegistry::register`].
    pub fn register_arc(
        &self,
        name: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
        category: CommandCategory,
        options: RegisterOptions,
    ) -> Result<()> {
        let name = name.into();
        let entry = Arc::new(RegistryEntry {
            name: name.clone(),
            handler,
            category,
            enabled: AtomicBool::new(options.enabled),
            permissions: options.permissions,
        });

        let mut entries = self.write();
        if entries.contains_key(&name) && !options.replace {
            return Err(SyloError::DuplicateCommand { name });
        }
        entries.insert(name.clone(), entry);
        drop(entries);

        tracing::debug!(
            component = module_path!(),
            op = "register",
            action = %name,
            category = category.as_str(),
            enabled = options.enabled,
            replaced = options.replace,
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<RegistryEntry>> {
        self.read().get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Entries in `category`, ordered by name
    pub fn get_by_category(&self, category: CommandCategory) -> Vec<Arc<RegistryEntry>> {
        let mut matching: Vec<_> = self
            .read()
            .values()
            .filter(|entry| entry.category == category)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        matching
    }

    pub fn get_all(&self) -> BTreeMap<String, Arc<RegistryEntry>> {
        self.read()
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect()
    }

    pub fn get_enabled(&self) -> BTreeMap<String, Arc<RegistryEntry>> {
        self.read()
            .iter()
            .filter(|(_, entry)| entry.is_enabled())
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect()
    }

    /// Validate `parameters` for the command registered as `name`
    pub fn validate_parameters(&self, name: &str, parameters: &Map<String, Value>) -> ValidationResult {
        match self.get(name) {
            Some(entry) => entry.validate(parameters),
            None => ValidationResult::invalid(format!("Command '{name}' not found")),
        }
    }

    /// Enable or disable a command; returns false if it does not exist
    pub fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        match self.get(name) {
            Some(entry) => {
                entry.set_enabled(enabled);
                tracing::info!(
                    component = module_path!(),
                    op = "set_enabled",
                    action = name,
                    enabled,
                );
                true
            }
            None => false,
        }
    }

    pub fn get_documentation(&self) -> BTreeMap<String, CommandDoc> {
        self.read()
            .iter()
            .map(|(name, entry)| (name.clone(), CommandDoc::from(entry.as_ref())))
            .collect()
    }

    /// Enabled command names per category; every category appears, possibly empty
    pub fn commands_by_category(&self) -> BTreeMap<CommandCategory, Vec<String>> {
        let mut grouped: BTreeMap<CommandCategory, Vec<String>> = CommandCategory::ALL
            .iter()
            .map(|category| (*category, Vec::new()))
            .collect();
        for (name, entry) in self.get_enabled() {
            grouped.entry(entry.category).or_default().push(name);
        }
        grouped
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn enabled_count(&self) -> usize {
        self.read().values().filter(|e| e.is_enabled()).count()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.len())
            .field("enabled", &self.enabled_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::FnCommand;
    use serde_json::json;

    fn noop(name: &str) -> FnCommand {
        FnCommand::new(name, format!("{name} command"), |_, _| async { Ok(Value::Null) })
    }

    fn bag(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = CommandRegistry::new();
        registry
            .register("ping", noop("ping"), CommandCategory::System, RegisterOptions::new())
            .unwrap();

        assert!(registry.has("ping"));
        let entry = registry.get("ping").unwrap();
        assert_eq!(entry.category(), CommandCategory::System);
        assert!(entry.is_enabled());
        assert!(entry.permissions().is_empty());
        assert!(registry.get("pong").is_none());
    }

    #[test]
    fn test_duplicate_rejected_unless_replace() {
        let registry = CommandRegistry::new();
        registry
            .register("ping", noop("ping"), CommandCategory::System, RegisterOptions::new())
            .unwrap();

        let err = registry
            .register("ping", noop("ping"), CommandCategory::Task, RegisterOptions::new())
            .unwrap_err();
        assert_eq!(err, SyloError::DuplicateCommand { name: "ping".to_string() });
        assert_eq!(registry.get("ping").unwrap().category(), CommandCategory::System);

        registry
            .register(
                "ping",
                noop("ping"),
                CommandCategory::Task,
                RegisterOptions::new().replace(),
            )
            .unwrap();
        assert_eq!(registry.get("ping").unwrap().category(), CommandCategory::Task);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_enabled_filtering_and_toggle() {
        let registry = CommandRegistry::new();
        registry
            .register("a", noop("a"), CommandCategory::Task, RegisterOptions::new())
            .unwrap();
        registry
            .register("b", noop("b"), CommandCategory::Task, RegisterOptions::new().disabled())
            .unwrap();

        assert_eq!(registry.get_all().len(), 2);
        assert_eq!(registry.get_enabled().keys().collect::<Vec<_>>(), vec!["a"]);

        assert!(registry.set_enabled("b", true));
        assert_eq!(registry.enabled_count(), 2);
        assert!(!registry.set_enabled("missing", true));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let registry = CommandRegistry::new();
        registry
            .register("a", noop("a"), CommandCategory::Task, RegisterOptions::new())
            .unwrap();
        let mut snapshot = registry.get_all();
        snapshot.clear();
        assert!(registry.has("a"));
    }

    #[test]
    fn test_by_category_is_sorted() {
        let registry = CommandRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register(name, noop(name), CommandCategory::Project, RegisterOptions::new())
                .unwrap();
        }
        registry
            .register("ping", noop("ping"), CommandCategory::System, RegisterOptions::new())
            .unwrap();

        let names: Vec<_> = registry
            .get_by_category(CommandCategory::Project)
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_validate_unknown_command() {
        let registry = CommandRegistry::new();
        let result = registry.validate_parameters("ghost", &Map::new());
        assert_eq!(result.errors, vec!["Command 'ghost' not found"]);
    }

    #[test]
    fn test_custom_validate_only_after_declarative_pass() {
        let registry = CommandRegistry::new();
        let cmd = noop("range")
            .param(ParameterSchema::number("low").required())
            .param(ParameterSchema::number("high").required())
            .with_validator(|params| {
                let low = params.get("low").and_then(Value::as_f64).unwrap_or_default();
                let high = params.get("high").and_then(Value::as_f64).unwrap_or_default();
                if low > high {
                    ValidationResult::invalid("low cannot be greater than high")
                } else {
                    ValidationResult::ok()
                }
            });
        registry
            .register("range", cmd, CommandCategory::Analytics, RegisterOptions::new())
            .unwrap();

        let missing = registry.validate_parameters("range", &bag(json!({"low": 9})));
        assert_eq!(missing.errors, vec!["Missing required parameter: high"]);

        let crossed = registry.validate_parameters("range", &bag(json!({"low": 9, "high": 1})));
        assert_eq!(crossed.errors, vec!["low cannot be greater than high"]);

        assert!(registry.validate_parameters("range", &bag(json!({"low": 1, "high": 9}))).valid);
    }

    #[test]
    fn test_documentation_uses_handler_metadata() {
        let registry = CommandRegistry::new();
        registry
            .register("rm_project", noop("delete_project"), CommandCategory::Project, RegisterOptions::new())
            .unwrap();

        let docs = registry.get_documentation();
        let doc = &docs["rm_project"];
        assert_eq!(doc.name, "delete_project");
        assert_eq!(doc.description, "delete_project command");
    }

    #[test]
    fn test_documentation_and_grouping() {
        let registry = CommandRegistry::new();
        registry
            .register(
                "delete_project",
                noop("delete_project").param(ParameterSchema::string("id").required()),
                CommandCategory::Project,
                RegisterOptions::new().permissions(["project:delete"]),
            )
            .unwrap();
        registry
            .register("ping", noop("ping"), CommandCategory::System, RegisterOptions::new().disabled())
            .unwrap();

        let docs = registry.get_documentation();
        let doc = &docs["delete_project"];
        assert_eq!(doc.permissions, vec!["project:delete"]);
        assert_eq!(doc.parameters.len(), 1);
        assert!(!docs["ping"].enabled);
        assert_eq!(doc.name, "delete_project");

        let grouped = registry.commands_by_category();
        assert_eq!(grouped.len(), CommandCategory::ALL.len());
        assert_eq!(grouped[&CommandCategory::Project], vec!["delete_project"]);
        assert!(grouped[&CommandCategory::System].is_empty());
    }
}
