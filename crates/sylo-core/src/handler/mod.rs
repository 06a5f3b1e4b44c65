//! Command handler contract
//!
//! A handler is a named unit of work with a parameter schema, an optional
//! custom validation step and an async body. Three ways to write one:
//! - implement [`CommandHandler`] directly against the raw parameter bag
//! - implement [`TypedCommand`] and wrap it in [`Typed`] to receive a decoded struct
//! - build a [`FnCommand`] from a closure (handy in tests and small tools)

pub mod context;
pub mod function;
pub mod typed;

pub use context::CommandContext;
pub use function::FnCommand;
pub use typed::{Typed, TypedCommand};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::model::ParameterSchema;
use crate::rules::validation::ValidationResult;

#[async_trait]
pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Declarative schema checked before `validate` and `execute`
    fn parameters(&self) -> &[ParameterSchema];

    /// Cross-field checks; only called once the declarative schema passes
    fn validate(&self, _parameters: &Map<String, Value>) -> ValidationResult {
        ValidationResult::ok()
    }

    /// Run the command
    ///
    /// # Errors
    ///
    /// Any error is reported to the caller as `EXECUTION_FAILED` with the
    /// error's top-level message.
    async fn execute(&self, parameters: &Map<String, Value>, ctx: &CommandContext)
        -> anyhow::Result<Value>;
}
