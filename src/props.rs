//! Property application: turns an untyped nested key/value payload into
//! typed, ordered mutations of one live object.
//!
//! Keys are processed in a fixed priority order regardless of payload
//! order: `Placement`, then `ViewObject`, then `Base`, then the remaining
//! keys in payload order with `Edges` special-cased. A failed `Base`
//! resolution aborts the whole call; earlier assignments are not rolled
//! back.

use serde_json::{Map, Value};

use crate::error::BridgeError;
use crate::model::{AttrValue, Document, EdgeSpec, Placement, Rotation, Vector3};

/// Whether the payload is being applied to a freshly created object or an
/// existing one. Creation additionally hides a resolved `Base` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    Create,
    Update,
}

/// Keys with dedicated handling; never reach the catch-all rule.
const STRUCTURAL_KEYS: [&str; 3] = ["Placement", "ViewObject", "Base"];

/// Apply a property payload to the named object. On success the owning
/// document is recomputed and the object's resolved name is returned.
pub fn apply_properties(
    doc: &mut Document,
    object_name: &str,
    payload: &Map<String, Value>,
    mode: ApplyMode,
) -> Result<String, BridgeError> {
    let resolved = doc
        .get_object(object_name)
        .map(|o| o.name().to_string())
        .ok_or_else(|| BridgeError::NotFound {
            what: format!("Object '{object_name}'"),
        })?;

    if let Some(value) = payload.get("Placement") {
        apply_placement(doc, object_name, value);
    }
    if let Some(value) = payload.get("ViewObject") {
        apply_view(doc, object_name, value);
    }
    if let Some(value) = payload.get("Base") {
        apply_base(doc, object_name, value, mode)?;
    }

    for (key, value) in payload {
        if STRUCTURAL_KEYS.contains(&key.as_str()) {
            continue;
        }
        if key == "Edges" {
            if let Value::Array(entries) = value {
                let edges = normalize_edges(entries)?;
                if let Some(object) = doc.get_object_mut(object_name) {
                    object.set_attribute("Edges", AttrValue::Edges(edges));
                }
                continue;
            }
        }
        apply_generic(doc, object_name, key, value)?;
    }

    doc.recompute();
    Ok(resolved)
}

/// Build and assign a placement from its nested shape. A payload that is
/// not an object leaves the existing placement untouched.
fn apply_placement(doc: &mut Document, object_name: &str, value: &Value) {
    let Value::Object(fields) = value else {
        return;
    };
    let placement = build_placement(fields);
    if let Some(object) = doc.get_object_mut(object_name) {
        object.set_placement(placement);
    }
}

fn build_placement(fields: &Map<String, Value>) -> Placement {
    let base = vector_from(fields.get("Base"));

    // An absent or empty Rotation falls back to the zero rotation. A zero
    // axis is kept as given together with the angle; only a nonzero axis
    // is normalized.
    let rotation = match fields.get("Rotation") {
        Some(Value::Object(rot)) if !rot.is_empty() => {
            let mut axis = vector_from(rot.get("Axis"));
            let angle = rot.get("Angle").and_then(Value::as_f64).unwrap_or(0.0);
            if axis.length() > 0.0 {
                axis = axis.normalized();
            }
            Rotation { axis, angle }
        }
        _ => Rotation::default(),
    };

    Placement {
        base,
        rotation,
    }
}

fn vector_from(value: Option<&Value>) -> Vector3 {
    let component = |key: &str| {
        value
            .and_then(|v| v.get(key))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    };
    Vector3::new(component("x"), component("y"), component("z"))
}

/// Assign nested view attributes. `ShapeColor` is coerced to a fixed RGBA
/// 4-tuple; `Visibility` maps to the visibility flag; everything else is
/// stored verbatim. A malformed `ShapeColor` stops the remaining view keys
/// but never aborts the apply call.
fn apply_view(doc: &mut Document, object_name: &str, value: &Value) {
    let Value::Object(fields) = value else {
        return;
    };
    let Some(object) = doc.get_object_mut(object_name) else {
        return;
    };
    for (key, entry) in fields {
        match key.as_str() {
            "ShapeColor" => match coerce_color(entry) {
                Some(color) => object.view_mut().shape_color = Some(color),
                None => return,
            },
            "Visibility" => {
                if let Some(flag) = entry.as_bool() {
                    object.view_mut().visibility = flag;
                }
            }
            _ => {
                object.view_mut().extra.insert(key.clone(), entry.clone());
            }
        }
    }
}

/// First four elements coerced to floats; fewer than four is malformed.
fn coerce_color(value: &Value) -> Option<[f64; 4]> {
    let entries = value.as_array()?;
    let mut channels = entries.iter().filter_map(Value::as_f64);
    Some([
        channels.next()?,
        channels.next()?,
        channels.next()?,
        channels.next()?,
    ])
}

/// Resolve a by-name reference to another object in the same document and
/// assign it. Resolution failure aborts the entire apply call. Creation
/// also hides the referenced object.
fn apply_base(
    doc: &mut Document,
    object_name: &str,
    value: &Value,
    mode: ApplyMode,
) -> Result<(), BridgeError> {
    let base_name = value.as_str().ok_or_else(|| BridgeError::Validation {
        message: "Base must be an object name".to_string(),
    })?;
    if doc.get_object(base_name).is_none() {
        return Err(BridgeError::NotFound {
            what: format!("Base object '{base_name}'"),
        });
    }
    if let Some(object) = doc.get_object_mut(object_name) {
        object.set_attribute("Base", AttrValue::Link(base_name.to_string()));
    }
    if mode == ApplyMode::Create {
        if let Some(base) = doc.get_object_mut(base_name) {
            base.view_mut().visibility = false;
        }
    }
    Ok(())
}

/// Normalize edge entries into fixed `(index, r1, r2)` triples. Two-element
/// entries repeat the single parameter (constant radius).
pub fn normalize_edges(entries: &[Value]) -> Result<Vec<EdgeSpec>, BridgeError> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let parts = entry.as_array().ok_or_else(|| invalid_edge(i))?;
            let index = parts
                .first()
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| invalid_edge(i))?;
            let radius1 = parts.get(1).and_then(Value::as_f64).ok_or_else(|| invalid_edge(i))?;
            let radius2 = match parts.len() {
                2 => radius1,
                3 => parts.get(2).and_then(Value::as_f64).ok_or_else(|| invalid_edge(i))?,
                _ => return Err(invalid_edge(i)),
            };
            Ok(EdgeSpec {
                index,
                radius1,
                radius2,
            })
        })
        .collect()
}

fn invalid_edge(position: usize) -> BridgeError {
    BridgeError::Validation {
        message: format!(
            "Edge entry {position} must be [index, r1] or [index, r1, r2]"
        ),
    }
}

/// The catch-all rule: assign only when the object's type schema exposes
/// the attribute; unknown keys are silently ignored.
fn apply_generic(
    doc: &mut Document,
    object_name: &str,
    key: &str,
    value: &Value,
) -> Result<(), BridgeError> {
    let Some(object) = doc.get_object_mut(object_name) else {
        return Ok(());
    };
    if !object.has_attribute(key) {
        return Ok(());
    }
    let typed = AttrValue::from_json(value).ok_or_else(|| BridgeError::Execution {
        message: format!("Unsupported value for attribute '{key}'"),
    })?;
    object.set_attribute(key, typed);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Workspace;
    use serde_json::json;

    fn workspace_with_box() -> Workspace {
        let mut ws = Workspace::new();
        let doc = ws.new_document("Main").unwrap();
        doc.add_object("Part::Box", "Box").unwrap();
        ws
    }

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn placement_position_and_normalized_axis() {
        let mut ws = workspace_with_box();
        let doc = ws.get_document_mut("Main").unwrap();
        let props = payload(json!({
            "Placement": {
                "Base": {"x": 1, "y": 2, "z": 3},
                "Rotation": {"Axis": {"x": 0, "y": 0, "z": 1}, "Angle": 90}
            }
        }));
        apply_properties(doc, "Box", &props, ApplyMode::Update).unwrap();
        let placement = *ws.get_document("Main").unwrap().get_object("Box").unwrap().placement();
        assert_eq!(placement.base, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(placement.rotation.axis, Vector3::new(0.0, 0.0, 1.0));
        assert!((placement.rotation.angle - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn placement_axis_is_normalized() {
        let mut ws = workspace_with_box();
        let doc = ws.get_document_mut("Main").unwrap();
        let props = payload(json!({
            "Placement": {"Rotation": {"Axis": {"x": 0, "y": 0, "z": 4}, "Angle": 45}}
        }));
        apply_properties(doc, "Box", &props, ApplyMode::Update).unwrap();
        let placement = *ws.get_document("Main").unwrap().get_object("Box").unwrap().placement();
        assert_eq!(placement.rotation.axis, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn zero_axis_kept_with_angle() {
        let mut ws = workspace_with_box();
        let doc = ws.get_document_mut("Main").unwrap();
        let props = payload(json!({
            "Placement": {"Rotation": {"Axis": {"x": 0, "y": 0, "z": 0}, "Angle": 45}}
        }));
        apply_properties(doc, "Box", &props, ApplyMode::Update).unwrap();
        let placement = *ws.get_document("Main").unwrap().get_object("Box").unwrap().placement();
        assert_eq!(placement.rotation.axis, Vector3::default());
        assert!((placement.rotation.angle - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_rotation_defaults_to_zero() {
        let mut ws = workspace_with_box();
        let doc = ws.get_document_mut("Main").unwrap();
        let props = payload(json!({"Placement": {"Base": {"x": 5}}}));
        apply_properties(doc, "Box", &props, ApplyMode::Update).unwrap();
        let placement = *ws.get_document("Main").unwrap().get_object("Box").unwrap().placement();
        assert_eq!(placement.base, Vector3::new(5.0, 0.0, 0.0));
        assert_eq!(placement.rotation, Rotation::default());
    }

    #[test]
    fn shape_color_becomes_four_floats() {
        let mut ws = workspace_with_box();
        let doc = ws.get_document_mut("Main").unwrap();
        let props = payload(json!({"ViewObject": {"ShapeColor": [1.0, 0.75, 0.8, 1.0]}}));
        apply_properties(doc, "Box", &props, ApplyMode::Update).unwrap();
        let view = ws.get_document("Main").unwrap().get_object("Box").unwrap().view().clone();
        assert_eq!(view.shape_color, Some([1.0, 0.75, 0.8, 1.0]));
    }

    #[test]
    fn view_passthrough_and_visibility() {
        let mut ws = workspace_with_box();
        let doc = ws.get_document_mut("Main").unwrap();
        let props = payload(json!({
            "ViewObject": {"Visibility": false, "LineWidth": 2.0}
        }));
        apply_properties(doc, "Box", &props, ApplyMode::Update).unwrap();
        let view = ws.get_document("Main").unwrap().get_object("Box").unwrap().view().clone();
        assert!(!view.visibility);
        assert_eq!(view.extra.get("LineWidth"), Some(&json!(2.0)));
    }

    #[test]
    fn malformed_shape_color_does_not_abort() {
        let mut ws = workspace_with_box();
        let doc = ws.get_document_mut("Main").unwrap();
        let props = payload(json!({
            "ViewObject": {"ShapeColor": [1.0, 0.5]},
            "Length": 20
        }));
        apply_properties(doc, "Box", &props, ApplyMode::Update).unwrap();
        let object = ws.get_document("Main").unwrap().get_object("Box").unwrap();
        assert_eq!(object.view().shape_color, None);
        assert_eq!(object.attribute("Length").and_then(AttrValue::as_float), Some(20.0));
    }

    #[test]
    fn missing_base_aborts_without_recompute() {
        let mut ws = workspace_with_box();
        let doc = ws.get_document_mut("Main").unwrap();
        doc.add_object("Part::Fillet", "Fillet").unwrap();
        let revision = doc.revision();
        let props = payload(json!({"Base": "Ghost", "Radius": 2.0}));
        let err = apply_properties(doc, "Fillet", &props, ApplyMode::Create).unwrap_err();
        assert!(err.to_string().contains("Base object"));
        let doc = ws.get_document("Main").unwrap();
        assert_eq!(doc.revision(), revision);
        // Base is processed before the catch-all keys, so Radius was never
        // assigned.
        assert!(doc.get_object("Fillet").unwrap().attribute("Radius").is_none());
    }

    #[test]
    fn base_failure_keeps_earlier_assignments() {
        let mut ws = workspace_with_box();
        let doc = ws.get_document_mut("Main").unwrap();
        doc.add_object("Part::Fillet", "Fillet").unwrap();
        let props = payload(json!({
            "Placement": {"Base": {"x": 7}},
            "Base": "Ghost"
        }));
        assert!(apply_properties(doc, "Fillet", &props, ApplyMode::Create).is_err());
        let object = ws.get_document("Main").unwrap().get_object("Fillet").unwrap();
        assert!((object.placement().base.x - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn base_hidden_on_create_only() {
        let mut ws = workspace_with_box();
        let doc = ws.get_document_mut("Main").unwrap();
        doc.add_object("Part::Fillet", "Fillet").unwrap();
        let props = payload(json!({"Base": "Box"}));
        apply_properties(doc, "Fillet", &props, ApplyMode::Create).unwrap();
        assert!(!doc.get_object("Box").unwrap().view().visibility);

        // Reset and re-apply in update mode: visibility untouched.
        doc.get_object_mut("Box").unwrap().view_mut().visibility = true;
        apply_properties(doc, "Fillet", &props, ApplyMode::Update).unwrap();
        assert!(doc.get_object("Box").unwrap().view().visibility);
        assert_eq!(
            doc.get_object("Fillet").unwrap().attribute("Base").and_then(AttrValue::as_link),
            Some("Box")
        );
    }

    #[test]
    fn edges_normalize_to_triples() {
        let entries = vec![json!([1, 1.0, 1.0]), json!([2, 0.5])];
        let edges = normalize_edges(&entries).unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges.first().map(|e| (e.index, e.radius1, e.radius2)), Some((1, 1.0, 1.0)));
        assert_eq!(edges.get(1).map(|e| (e.index, e.radius1, e.radius2)), Some((2, 0.5, 0.5)));
    }

    #[test]
    fn malformed_edge_entry_is_rejected() {
        assert!(normalize_edges(&[json!([1])]).is_err());
        assert!(normalize_edges(&[json!("e1")]).is_err());
        assert!(normalize_edges(&[json!([1, 1.0, 2.0, 3.0])]).is_err());
    }

    #[test]
    fn unknown_key_silently_ignored() {
        let mut ws = workspace_with_box();
        let doc = ws.get_document_mut("Main").unwrap();
        let props = payload(json!({"Length": 20, "Frobnicate": 1}));
        apply_properties(doc, "Box", &props, ApplyMode::Update).unwrap();
        let object = ws.get_document("Main").unwrap().get_object("Box").unwrap();
        assert_eq!(object.attribute("Length").and_then(AttrValue::as_float), Some(20.0));
        assert!(object.attribute("Frobnicate").is_none());
    }

    #[test]
    fn reapplying_payload_is_idempotent() {
        let mut ws = workspace_with_box();
        let doc = ws.get_document_mut("Main").unwrap();
        let props = payload(json!({
            "Length": 20,
            "Width": 15,
            "Placement": {"Base": {"x": 1, "y": 2, "z": 3}},
            "ViewObject": {"ShapeColor": [0.2, 0.4, 0.6, 1.0]}
        }));
        apply_properties(doc, "Box", &props, ApplyMode::Update).unwrap();
        let first = doc.get_object("Box").unwrap().clone();
        apply_properties(doc, "Box", &props, ApplyMode::Update).unwrap();
        let second = doc.get_object("Box").unwrap();
        assert_eq!(first.attribute("Length"), second.attribute("Length"));
        assert_eq!(first.attribute("Width"), second.attribute("Width"));
        assert_eq!(first.placement(), second.placement());
        assert_eq!(first.view().shape_color, second.view().shape_color);
    }

    #[test]
    fn recompute_runs_after_success() {
        let mut ws = workspace_with_box();
        let doc = ws.get_document_mut("Main").unwrap();
        let revision = doc.revision();
        apply_properties(doc, "Box", &payload(json!({"Length": 20})), ApplyMode::Update).unwrap();
        assert_eq!(ws.get_document("Main").unwrap().revision(), revision + 1);
    }
}
