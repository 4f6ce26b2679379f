//! The bridge's command set. Each variant captures the arguments of one
//! mutating operation at enqueue time; names are resolved against the
//! model only at execution time, on the owning thread.

use serde_json::{Map, Value};

use crate::error::BridgeError;
use crate::model::{AttrValue, Document, SketchGeometry, Workspace};
use crate::props::{self, ApplyMode};

/// A queued mutating operation. Executed exactly once, in enqueue order,
/// then discarded regardless of outcome.
#[derive(Debug, Clone)]
pub enum BridgeCommand {
    NewDocument {
        name: String,
    },
    NewObject {
        document: String,
        object: String,
        object_type: String,
        properties: Map<String, Value>,
    },
    UpdateObject {
        document: String,
        object: String,
        properties: Map<String, Value>,
    },
    DeleteObject {
        document: String,
        object: String,
    },
    UpdateEdges {
        document: String,
        object: String,
        edges: Vec<Value>,
    },
    NewSketch {
        document: String,
        name: String,
    },
    AddSketchCircle {
        document: String,
        sketch: String,
        center_x: f64,
        center_y: f64,
        radius: f64,
    },
    AddSketchRectangle {
        document: String,
        sketch: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Extrude {
        document: String,
        name: String,
        sketch: String,
        length: f64,
    },
    RunScript {
        source: String,
    },
}

/// Result of executing a command, recorded host-side only.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub message: String,
    /// Resolved name of the object the command touched, when there is one.
    pub object: Option<String>,
}

impl CommandOutcome {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            object: None,
        }
    }

    fn with_object(message: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            object: Some(object.into()),
        }
    }
}

impl BridgeCommand {
    /// Short human-readable description for log lines and the outcome
    /// ring buffer.
    pub fn describe(&self) -> String {
        match self {
            BridgeCommand::NewDocument { name } => format!("new_document '{name}'"),
            BridgeCommand::NewObject {
                document, object, object_type, ..
            } => format!("new_object '{document}/{object}' ({object_type})"),
            BridgeCommand::UpdateObject { document, object, .. } => {
                format!("update_object '{document}/{object}'")
            }
            BridgeCommand::DeleteObject { document, object } => {
                format!("delete_object '{document}/{object}'")
            }
            BridgeCommand::UpdateEdges { document, object, .. } => {
                format!("update_edges '{document}/{object}'")
            }
            BridgeCommand::NewSketch { document, name } => {
                format!("new_sketch '{document}/{name}'")
            }
            BridgeCommand::AddSketchCircle { document, sketch, .. } => {
                format!("add_sketch_circle '{document}/{sketch}'")
            }
            BridgeCommand::AddSketchRectangle { document, sketch, .. } => {
                format!("add_sketch_rectangle '{document}/{sketch}'")
            }
            BridgeCommand::Extrude { document, name, sketch, .. } => {
                format!("extrude '{document}/{name}' from '{sketch}'")
            }
            BridgeCommand::RunScript { source } => {
                format!("run_script ({} bytes)", source.len())
            }
        }
    }

    /// Execute against the workspace. Runs on the owning thread only.
    pub fn execute(&self, ws: &mut Workspace) -> Result<CommandOutcome, BridgeError> {
        match self {
            BridgeCommand::NewDocument { name } => {
                let doc = ws.new_document(name)?;
                doc.recompute();
                Ok(CommandOutcome::new(format!("Document '{name}' created.")))
            }

            BridgeCommand::NewObject {
                document,
                object,
                object_type,
                properties,
            } => {
                let doc = require_document(ws, document)?;
                doc.add_object(object_type, object)?;
                let resolved = props::apply_properties(doc, object, properties, ApplyMode::Create)?;
                Ok(CommandOutcome::with_object(
                    format!("Object '{object}' created."),
                    resolved,
                ))
            }

            BridgeCommand::UpdateObject {
                document,
                object,
                properties,
            } => {
                let doc = require_document(ws, document)?;
                if doc.get_object(object).is_none() {
                    return Err(BridgeError::NotFound {
                        what: format!("Object '{object}'"),
                    });
                }
                let resolved = props::apply_properties(doc, object, properties, ApplyMode::Update)?;
                Ok(CommandOutcome::with_object(
                    format!("Object '{object}' updated."),
                    resolved,
                ))
            }

            BridgeCommand::DeleteObject { document, object } => {
                let doc = require_document(ws, document)?;
                doc.remove_object(object)?;
                doc.recompute();
                Ok(CommandOutcome::new(format!("Object '{object}' deleted.")))
            }

            BridgeCommand::UpdateEdges {
                document,
                object,
                edges,
            } => {
                let doc = require_document(ws, document)?;
                let triples = props::normalize_edges(edges)?;
                let target = doc
                    .get_object_mut(object)
                    .ok_or_else(|| BridgeError::NotFound {
                        what: format!("Object '{object}'"),
                    })?;
                let count = triples.len();
                target.set_attribute("Edges", AttrValue::Edges(triples));
                doc.recompute();
                Ok(CommandOutcome::with_object(
                    format!("Assigned {count} edge entries to '{object}'."),
                    object.clone(),
                ))
            }

            BridgeCommand::NewSketch { document, name } => {
                let doc = require_document(ws, document)?;
                let sketch = doc.add_object("Sketcher::SketchObject", name)?;
                sketch.set_attribute("Geometry", AttrValue::Geometry(Vec::new()));
                doc.recompute();
                Ok(CommandOutcome::with_object(
                    format!("Sketch '{name}' created."),
                    name.clone(),
                ))
            }

            BridgeCommand::AddSketchCircle {
                document,
                sketch,
                center_x,
                center_y,
                radius,
            } => {
                let doc = require_document(ws, document)?;
                push_geometry(
                    doc,
                    sketch,
                    SketchGeometry::Circle {
                        center_x: *center_x,
                        center_y: *center_y,
                        radius: *radius,
                    },
                )?;
                doc.recompute();
                Ok(CommandOutcome::with_object(
                    format!("Circle added to sketch '{sketch}'."),
                    sketch.clone(),
                ))
            }

            BridgeCommand::AddSketchRectangle {
                document,
                sketch,
                x,
                y,
                width,
                height,
            } => {
                let doc = require_document(ws, document)?;
                push_geometry(
                    doc,
                    sketch,
                    SketchGeometry::Rectangle {
                        x: *x,
                        y: *y,
                        width: *width,
                        height: *height,
                    },
                )?;
                doc.recompute();
                Ok(CommandOutcome::with_object(
                    format!("Rectangle added to sketch '{sketch}'."),
                    sketch.clone(),
                ))
            }

            BridgeCommand::Extrude {
                document,
                name,
                sketch,
                length,
            } => {
                let doc = require_document(ws, document)?;
                if doc.get_object(sketch).is_none() {
                    return Err(BridgeError::NotFound {
                        what: format!("Sketch '{sketch}'"),
                    });
                }
                let extrusion = doc.add_object("Part::Extrusion", name)?;
                extrusion.set_attribute("Base", AttrValue::Link(sketch.clone()));
                extrusion.set_attribute("LengthFwd", AttrValue::Float(*length));
                extrusion.set_attribute("Solid", AttrValue::Bool(true));
                // The consumed sketch is hidden, like any created link base.
                if let Some(base) = doc.get_object_mut(sketch) {
                    base.view_mut().visibility = false;
                }
                doc.recompute();
                Ok(CommandOutcome::with_object(
                    format!("Extrusion '{name}' created from '{sketch}'."),
                    name.clone(),
                ))
            }

            BridgeCommand::RunScript { source } => {
                ws.run_script(source)?;
                Ok(CommandOutcome::new("Script executed."))
            }
        }
    }
}

fn require_document<'a>(
    ws: &'a mut Workspace,
    name: &str,
) -> Result<&'a mut Document, BridgeError> {
    ws.get_document_mut(name).ok_or_else(|| BridgeError::NotFound {
        what: format!("Document '{name}'"),
    })
}

/// Append one geometry element to a sketch's geometry list.
fn push_geometry(
    doc: &mut Document,
    sketch: &str,
    geometry: SketchGeometry,
) -> Result<(), BridgeError> {
    let object = doc
        .get_object_mut(sketch)
        .ok_or_else(|| BridgeError::NotFound {
            what: format!("Sketch '{sketch}'"),
        })?;
    if object.type_name() != "Sketcher::SketchObject" {
        return Err(BridgeError::Execution {
            message: format!("Object '{sketch}' is not a sketch"),
        });
    }
    let mut elements = object
        .attribute("Geometry")
        .and_then(AttrValue::as_geometry)
        .map(<[SketchGeometry]>::to_vec)
        .unwrap_or_default();
    elements.push(geometry);
    object.set_attribute("Geometry", AttrValue::Geometry(elements));
    Ok(())
}
