use schemars::schema_for;
use serde::Serialize;
use serde_json::Value;

/// A catalog entry: metadata plus the JSON schema for the params.
#[derive(Debug, Clone, Serialize)]
pub struct ToolEntry {
    pub name: &'static str,
    pub description: &'static str,
    /// Whether calls are queued for the owning thread (true) or answered
    /// synchronously (false, read-only).
    pub queued: bool,
    pub param_schema: Value,
}

pub(super) fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

pub(super) fn schema_value<T: schemars::JsonSchema>() -> Value {
    let root = schema_for!(T);
    serde_json::to_value(root).unwrap_or(empty_object_schema())
}

pub(super) fn de<T: serde::de::DeserializeOwned>(input: &Value) -> Result<T, String> {
    serde_json::from_value(input.clone()).map_err(|e| e.to_string())
}

/// Generate the JSON tool list served at `GET /api/tools`.
pub fn to_json_schema() -> Value {
    Value::Array(
        super::tool_entries()
            .iter()
            .map(|e| {
                serde_json::json!({
                    "name": e.name,
                    "description": e.description,
                    "queued": e.queued,
                    "inputSchema": e.param_schema,
                })
            })
            .collect(),
    )
}
