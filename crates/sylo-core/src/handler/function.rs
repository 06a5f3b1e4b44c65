//! Closure-backed command handler

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;

use super::{CommandContext, CommandHandler};
use crate::model::ParameterSchema;
use crate::rules::validation::ValidationResult;

type ExecuteFn =
    Arc<dyn Fn(Map<String, Value>, CommandContext) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync>;
type ValidateFn = Arc<dyn Fn(&Map<String, Value>) -> ValidationResult + Send + Sync>;

/// A handler assembled from closures
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use sylo_core::{FnCommand, ParameterSchema};
///
/// let echo = FnCommand::new("echo", "Return the input", |params, _ctx| async move {
///     Ok(json!(params))
/// })
/// .param(ParameterSchema::string("text").required());
/// ```
#[derive(Clone)]
pub struct FnCommand {
    name: String,
    description: String,
    parameters: Vec<ParameterSchema>,
    execute: ExecuteFn,
    validate: Option<ValidateFn>,
}

impl FnCommand {
    pub fn new<F, Fut>(name: impl Into<String>, description: impl Into<String>, execute: F) -> Self
    where
        F: Fn(Map<String, Value>, CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            execute: Arc::new(move |params, ctx| execute(params, ctx).boxed()),
            validate: None,
        }
    }

    pub fn param(mut self, schema: ParameterSchema) -> Self {
        self.parameters.push(schema);
        self
    }

    pub fn with_validator<V>(mut self, validate: V) -> Self
    where
        V: Fn(&Map<String, Value>) -> ValidationResult + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self
    }
}

impl std::fmt::Debug for FnCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCommand")
            .field("name", &self.name)
            .field("parameters", &self.parameters.len())
            .field("has_validator", &self.validate.is_some())
            .finish()
    }
}

#[async_trait]
impl CommandHandler for FnCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &[ParameterSchema] {
        &self.parameters
    }

    fn validate(&self, parameters: &Map<String, Value>) -> ValidationResult {
        match &self.validate {
            Some(validate) => validate(parameters),
            None => ValidationResult::ok(),
        }
    }

    async fn execute(
        &self,
        parameters: &Map<String, Value>,
        ctx: &CommandContext,
    ) -> anyhow::Result<Value> {
        (self.execute)(parameters.clone(), ctx.clone()).await
    }
}
