use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_document_name() -> String {
    "Unnamed".to_string()
}

// ── Document params ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateDocumentParams {
    #[serde(default = "default_document_name")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetDocumentParams {
    pub name: String,
}

// ── Object params ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateObjectParams {
    pub document_name: String,
    pub object_name: String,
    /// Declared type, e.g. `Part::Box`, `Part::Sphere`, `Draft::Circle`.
    pub object_type: String,
    /// Nested property payload (Length, Placement, ViewObject, ...).
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateObjectParams {
    pub document_name: String,
    pub object_name: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeleteObjectParams {
    pub document_name: String,
    pub object_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateEdgesParams {
    pub document_name: String,
    pub object_name: String,
    /// Edge entries, each `[index, r1]` or `[index, r1, r2]`.
    pub edges: Vec<Value>,
}

// ── Sketch params ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateSketchParams {
    pub document_name: String,
    pub sketch_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddSketchCircleParams {
    pub document_name: String,
    pub sketch_name: String,
    #[serde(default)]
    pub center_x: f64,
    #[serde(default)]
    pub center_y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddSketchRectangleParams {
    pub document_name: String,
    pub sketch_name: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtrudeParams {
    pub document_name: String,
    pub object_name: String,
    pub sketch_name: String,
    pub length: f64,
}

// ── Script params ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteCodeParams {
    /// Newline-separated host directives.
    pub code: String,
}
