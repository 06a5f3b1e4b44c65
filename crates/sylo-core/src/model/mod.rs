pub mod category;
pub mod command;
pub mod identity;
pub mod response;
pub mod schema;

pub use category::CommandCategory;
pub use command::{CommandRequest, RequestMetadata};
pub use identity::CallerIdentity;
pub use response::{ErrorBody, ResponseEnvelope, ResponseMetadata};
pub use schema::{ParamType, ParameterSchema, ValidationRules};
