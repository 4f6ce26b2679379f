//! The operation catalog: every call the listener accepts, its params
//! schema, and the mapping from a named tool call to either a queued
//! command or a synchronous read.

pub mod catalog;
pub mod params;
pub mod validation;

use serde_json::Value;

use crate::command::BridgeCommand;
use crate::error::BridgeError;

use catalog::{de, empty_object_schema, schema_value, ToolEntry};
use params::{
    AddSketchCircleParams, AddSketchRectangleParams, CreateDocumentParams, CreateObjectParams,
    CreateSketchParams, DeleteObjectParams, ExecuteCodeParams, ExtrudeParams, GetDocumentParams,
    UpdateEdgesParams, UpdateObjectParams,
};

/// A read-only operation, answered synchronously off the owning thread.
#[derive(Debug, Clone)]
pub enum ReadOp {
    GetDocument { name: String },
    ListDocuments,
}

/// What the facade does with a resolved call: hand it to the owning
/// thread, or answer it in place.
#[derive(Debug, Clone)]
pub enum Dispatch {
    Queue(BridgeCommand),
    Read(ReadOp),
}

/// Resolve a named tool call into its dispatch. Unknown names and
/// malformed params are validation errors — the only error class a remote
/// caller sees synchronously.
pub fn resolve(name: &str, input: &Value) -> Result<Dispatch, BridgeError> {
    let invalid = |e: String| BridgeError::Validation {
        message: format!("Invalid params for '{name}': {e}"),
    };
    match name {
        "create_document" => {
            let p: CreateDocumentParams = de(input).map_err(invalid)?;
            validation::non_empty(&p.name, "name")?;
            Ok(Dispatch::Queue(BridgeCommand::NewDocument { name: p.name }))
        }
        "get_document" => {
            let p: GetDocumentParams = de(input).map_err(invalid)?;
            validation::non_empty(&p.name, "name")?;
            Ok(Dispatch::Read(ReadOp::GetDocument { name: p.name }))
        }
        "list_documents" => Ok(Dispatch::Read(ReadOp::ListDocuments)),
        "create_object" => {
            let p: CreateObjectParams = de(input).map_err(invalid)?;
            validation::non_empty(&p.document_name, "document_name")?;
            validation::non_empty(&p.object_name, "object_name")?;
            validation::non_empty(&p.object_type, "object_type")?;
            Ok(Dispatch::Queue(BridgeCommand::NewObject {
                document: p.document_name,
                object: p.object_name,
                object_type: p.object_type,
                properties: p.properties,
            }))
        }
        "update_object" => {
            let p: UpdateObjectParams = de(input).map_err(invalid)?;
            validation::non_empty(&p.document_name, "document_name")?;
            validation::non_empty(&p.object_name, "object_name")?;
            Ok(Dispatch::Queue(BridgeCommand::UpdateObject {
                document: p.document_name,
                object: p.object_name,
                properties: p.properties,
            }))
        }
        "delete_object" => {
            let p: DeleteObjectParams = de(input).map_err(invalid)?;
            validation::non_empty(&p.document_name, "document_name")?;
            validation::non_empty(&p.object_name, "object_name")?;
            Ok(Dispatch::Queue(BridgeCommand::DeleteObject {
                document: p.document_name,
                object: p.object_name,
            }))
        }
        "update_edges" => {
            let p: UpdateEdgesParams = de(input).map_err(invalid)?;
            validation::non_empty(&p.document_name, "document_name")?;
            validation::non_empty(&p.object_name, "object_name")?;
            Ok(Dispatch::Queue(BridgeCommand::UpdateEdges {
                document: p.document_name,
                object: p.object_name,
                edges: p.edges,
            }))
        }
        "create_sketch" => {
            let p: CreateSketchParams = de(input).map_err(invalid)?;
            validation::non_empty(&p.document_name, "document_name")?;
            validation::non_empty(&p.sketch_name, "sketch_name")?;
            Ok(Dispatch::Queue(BridgeCommand::NewSketch {
                document: p.document_name,
                name: p.sketch_name,
            }))
        }
        "add_sketch_circle" => {
            let p: AddSketchCircleParams = de(input).map_err(invalid)?;
            validation::non_empty(&p.document_name, "document_name")?;
            validation::non_empty(&p.sketch_name, "sketch_name")?;
            validation::finite(p.center_x, "center_x")?;
            validation::finite(p.center_y, "center_y")?;
            validation::positive_finite(p.radius, "radius")?;
            Ok(Dispatch::Queue(BridgeCommand::AddSketchCircle {
                document: p.document_name,
                sketch: p.sketch_name,
                center_x: p.center_x,
                center_y: p.center_y,
                radius: p.radius,
            }))
        }
        "add_sketch_rectangle" => {
            let p: AddSketchRectangleParams = de(input).map_err(invalid)?;
            validation::non_empty(&p.document_name, "document_name")?;
            validation::non_empty(&p.sketch_name, "sketch_name")?;
            validation::finite(p.x, "x")?;
            validation::finite(p.y, "y")?;
            validation::positive_finite(p.width, "width")?;
            validation::positive_finite(p.height, "height")?;
            Ok(Dispatch::Queue(BridgeCommand::AddSketchRectangle {
                document: p.document_name,
                sketch: p.sketch_name,
                x: p.x,
                y: p.y,
                width: p.width,
                height: p.height,
            }))
        }
        "extrude" => {
            let p: ExtrudeParams = de(input).map_err(invalid)?;
            validation::non_empty(&p.document_name, "document_name")?;
            validation::non_empty(&p.object_name, "object_name")?;
            validation::non_empty(&p.sketch_name, "sketch_name")?;
            validation::positive_finite(p.length, "length")?;
            Ok(Dispatch::Queue(BridgeCommand::Extrude {
                document: p.document_name,
                name: p.object_name,
                sketch: p.sketch_name,
                length: p.length,
            }))
        }
        "execute_code" => {
            let p: ExecuteCodeParams = de(input).map_err(invalid)?;
            Ok(Dispatch::Queue(BridgeCommand::RunScript { source: p.code }))
        }
        _ => Err(BridgeError::Validation {
            message: format!("Unknown operation: {name}"),
        }),
    }
}

/// The complete catalog, one entry per accepted call.
pub fn tool_entries() -> Vec<ToolEntry> {
    vec![
        ToolEntry {
            name: "create_document",
            description: "Create a new document. Queued for the owning thread.",
            queued: true,
            param_schema: schema_value::<CreateDocumentParams>(),
        },
        ToolEntry {
            name: "get_document",
            description: "Get a document by name. Answered synchronously.",
            queued: false,
            param_schema: schema_value::<GetDocumentParams>(),
        },
        ToolEntry {
            name: "list_documents",
            description: "List all open documents. Answered synchronously.",
            queued: false,
            param_schema: empty_object_schema(),
        },
        ToolEntry {
            name: "create_object",
            description: "Create an object of a declared type (e.g. 'Part::Box') with a nested property payload.",
            queued: true,
            param_schema: schema_value::<CreateObjectParams>(),
        },
        ToolEntry {
            name: "update_object",
            description: "Update properties of an existing object.",
            queued: true,
            param_schema: schema_value::<UpdateObjectParams>(),
        },
        ToolEntry {
            name: "delete_object",
            description: "Delete an object from a document.",
            queued: true,
            param_schema: schema_value::<DeleteObjectParams>(),
        },
        ToolEntry {
            name: "update_edges",
            description: "Assign fillet/chamfer edge entries ([index, r1] or [index, r1, r2]) to an object.",
            queued: true,
            param_schema: schema_value::<UpdateEdgesParams>(),
        },
        ToolEntry {
            name: "create_sketch",
            description: "Create an empty sketch in a document.",
            queued: true,
            param_schema: schema_value::<CreateSketchParams>(),
        },
        ToolEntry {
            name: "add_sketch_circle",
            description: "Add a circle to a sketch.",
            queued: true,
            param_schema: schema_value::<AddSketchCircleParams>(),
        },
        ToolEntry {
            name: "add_sketch_rectangle",
            description: "Add a rectangle to a sketch.",
            queued: true,
            param_schema: schema_value::<AddSketchRectangleParams>(),
        },
        ToolEntry {
            name: "extrude",
            description: "Extrude a sketch into a solid.",
            queued: true,
            param_schema: schema_value::<ExtrudeParams>(),
        },
        ToolEntry {
            name: "execute_code",
            description: "Run a host directive script. Queued; blocks later commands until it returns.",
            queued: true,
            param_schema: schema_value::<ExecuteCodeParams>(),
        },
    ]
}
