//! Typed command adapter
//!
//! `TypedCommand` lets a handler receive its parameters as a deserialized
//! struct. The declarative schema still runs first, so the struct decode only
//! sees input that already has the right shape.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{CommandContext, CommandHandler};
use crate::model::ParameterSchema;
use crate::rules::validation::ValidationResult;

#[async_trait]
pub trait TypedCommand: Send + Sync + 'static {
    type Params: DeserializeOwned + Send;
    type Output: Serialize + Send;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> Vec<ParameterSchema>;

    fn validate(&self, _params: &Self::Params) -> ValidationResult {
        ValidationResult::ok()
    }

    /// # Errors
    ///
    /// Reported to the caller as `EXECUTION_FAILED`.
    async fn run(&self, params: Self::Params, ctx: &CommandContext) -> anyhow::Result<Self::Output>;
}

/// Wraps a [`TypedCommand`] so it can be registered as a [`CommandHandler`]
pub struct Typed<C: TypedCommand> {
    command: C,
    schema: Vec<ParameterSchema>,
}

impl<C: TypedCommand> Typed<C> {
    pub fn new(command: C) -> Self {
        let schema = command.parameters();
        Self { command, schema }
    }
}

fn decode<P: DeserializeOwned>(parameters: &Map<String, Value>) -> serde_json::Result<P> {
    serde_json::from_value(Value::Object(parameters.clone()))
}

#[async_trait]
impl<C: TypedCommand> CommandHandler for Typed<C> {
    fn name(&self) -> &str {
        self.command.name()
    }

    fn description(&self) -> &str {
        self.command.description()
    }

    fn parameters(&self) -> &[ParameterSchema] {
        &self.schema
    }

    fn validate(&self, parameters: &Map<String, Value>) -> ValidationResult {
        match decode::<C::Params>(parameters) {
            Ok(params) => self.command.validate(&params),
            Err(err) => ValidationResult::invalid(format!("Invalid parameters: {err}")),
        }
    }

    async fn execute(
        &self,
        parameters: &Map<String, Value>,
        ctx: &CommandContext,
    ) -> anyhow::Result<Value> {
        let params = decode::<C::Params>(parameters)?;
        let output = self.command.run(params, ctx).await?;
        Ok(serde_json::to_value(output)?)
    }
}
