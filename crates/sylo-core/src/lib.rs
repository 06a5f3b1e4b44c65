//! Sylo Core - command orchestration kernel
//!
//! This crate provides the building blocks the orchestrator dispatches through:
//! - Command request, caller identity, parameter schema and response envelope models
//! - The declarative parameter validator
//! - Command handler traits (untyped, typed and closure-backed)
//! - The permission policy and persistence backend collaborator traits
//! - The command registry
//! - The canonical error taxonomy and structured logging facility

pub mod errors;
pub mod handler;
pub mod logging_facility;
pub mod model;
pub mod persistence;
pub mod policy;
pub mod registry;
pub mod rules;

// Re-export commonly used types
pub use errors::{CoreError, ErrorCode, Result, SyloError};
pub use handler::{CommandContext, CommandHandler, FnCommand, Typed, TypedCommand};
pub use model::{
    CallerIdentity, CommandCategory, CommandRequest, ErrorBody, ParamType, ParameterSchema,
    ResponseEnvelope, ResponseMetadata, ValidationRules,
};
pub use persistence::{NoopBackend, PersistenceBackend, HealthCheckError};
pub use policy::{DenyByDefaultPolicy, PermissionPolicy, PermissivePolicy, RolePermissionPolicy};
pub use registry::{CommandDoc, CommandRegistry, RegisterOptions, RegistryEntry};
pub use rules::validation::{validate_parameters, ValidationResult};
