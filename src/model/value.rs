use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A 3-component vector used for positions and rotation axes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit-length copy of this vector. Only meaningful when `length() > 0`;
    /// callers check first.
    pub fn normalized(&self) -> Vector3 {
        let len = self.length();
        Vector3::new(self.x / len, self.y / len, self.z / len)
    }
}

/// An axis/angle rotation. A zero axis with angle 0 is the identity; a zero
/// axis is preserved as given rather than replaced with a canonical identity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub axis: Vector3,
    pub angle: f64,
}

/// An object's pose: position plus rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub base: Vector3,
    pub rotation: Rotation,
}

/// One edge entry for fillet/chamfer-style objects:
/// edge index plus two shape parameters (equal for a constant radius).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub index: u32,
    pub radius1: f64,
    pub radius2: f64,
}

/// Geometry primitives a sketch can hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SketchGeometry {
    Circle {
        center_x: f64,
        center_y: f64,
        radius: f64,
    },
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

/// Type-safe attribute values for document objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
    FloatList(Vec<f64>),
    Edges(Vec<EdgeSpec>),
    Placement(Placement),
    /// RGBA, each channel in [0, 1].
    Color([f64; 4]),
    /// Name of another object in the same document.
    Link(String),
    Geometry(Vec<SketchGeometry>),
}

impl AttrValue {
    /// Coerce an untyped JSON value into a typed attribute value.
    /// Returns None for shapes no attribute accepts (nested objects,
    /// mixed arrays).
    pub fn from_json(value: &Value) -> Option<AttrValue> {
        match value {
            Value::Bool(b) => Some(AttrValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(AttrValue::Int(i))
                } else {
                    n.as_f64().map(AttrValue::Float)
                }
            }
            Value::String(s) => Some(AttrValue::Text(s.clone())),
            Value::Array(items) => {
                let floats: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
                floats.map(AttrValue::FloatList)
            }
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(v) => Some(*v),
            #[allow(clippy::cast_precision_loss)]
            AttrValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&str> {
        match self {
            AttrValue::Link(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_placement(&self) -> Option<&Placement> {
        match self {
            AttrValue::Placement(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<[f64; 4]> {
        match self {
            AttrValue::Color(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_edges(&self) -> Option<&[EdgeSpec]> {
        match self {
            AttrValue::Edges(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&[SketchGeometry]> {
        match self {
            AttrValue::Geometry(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_unit_z() {
        let v = Vector3::new(0.0, 0.0, 4.0);
        assert!((v.normalized().z - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_vector_length() {
        assert!(Vector3::default().length().abs() < f64::EPSILON);
    }

    #[test]
    fn coerce_scalars() {
        assert_eq!(AttrValue::from_json(&json!(20)), Some(AttrValue::Int(20)));
        assert_eq!(
            AttrValue::from_json(&json!(1.5)),
            Some(AttrValue::Float(1.5))
        );
        assert_eq!(
            AttrValue::from_json(&json!(true)),
            Some(AttrValue::Bool(true))
        );
        assert_eq!(
            AttrValue::from_json(&json!("Box")),
            Some(AttrValue::Text("Box".into()))
        );
    }

    #[test]
    fn coerce_numeric_array() {
        assert_eq!(
            AttrValue::from_json(&json!([1.0, 2, 3.5])),
            Some(AttrValue::FloatList(vec![1.0, 2.0, 3.5]))
        );
    }

    #[test]
    fn reject_nested_object() {
        assert_eq!(AttrValue::from_json(&json!({"x": 1})), None);
    }

    #[test]
    fn int_reads_as_float() {
        assert_eq!(AttrValue::Int(20).as_float(), Some(20.0));
    }
}
