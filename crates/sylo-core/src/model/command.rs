use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Optional caller-supplied request metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// A named command invocation
///
/// Constructed per call by a transport adapter and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub action: String,
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RequestMetadata>,
}

impl CommandRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            parameters: Map::new(),
            metadata: None,
        }
    }

    /// Replace the parameter bag; non-object values yield an empty bag.
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = match parameters {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.metadata = Some(RequestMetadata {
            request_id: Some(request_id.into()),
        });
        self
    }

    /// The caller-supplied request id, if any
    pub fn request_id(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.request_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_collects_parameters() {
        let cmd = CommandRequest::new("create_widget")
            .with_param("name", json!("Chair"))
            .with_request_id("abc-123");
        assert_eq!(cmd.parameters.get("name"), Some(&json!("Chair")));
        assert_eq!(cmd.request_id(), Some("abc-123"));
    }

    #[test]
    fn test_wire_shape_uses_camel_case_metadata() {
        let cmd: CommandRequest = serde_json::from_value(json!({
            "action": "ping",
            "parameters": {},
            "metadata": { "requestId": "r-1" }
        }))
        .unwrap();
        assert_eq!(cmd.request_id(), Some("r-1"));
    }

    #[test]
    fn test_parameters_must_be_an_object() {
        let parsed: Result<CommandRequest, _> =
            serde_json::from_value(json!({ "action": "ping", "parameters": [1, 2] }));
        assert!(parsed.is_err());
    }
}
