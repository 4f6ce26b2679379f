//! Per-type attribute schemas for document objects.
//!
//! Each declared object type maps to the set of data attributes it
//! recognizes. The property applier consults the schema resolved at object
//! creation instead of probing a live object for attribute presence.
//! Placement and the view sub-object exist on every object and are not
//! listed here.

/// Attribute schema for one object type.
#[derive(Debug, Clone, Copy)]
pub struct TypeSchema {
    pub type_name: &'static str,
    pub attributes: &'static [&'static str],
}

impl TypeSchema {
    pub fn recognizes(&self, attribute: &str) -> bool {
        self.attributes.contains(&attribute)
    }
}

/// All object types the reference host understands.
static TYPE_SCHEMAS: &[TypeSchema] = &[
    TypeSchema {
        type_name: "Part::Box",
        attributes: &["Length", "Width", "Height"],
    },
    TypeSchema {
        type_name: "Part::Cylinder",
        attributes: &["Radius", "Height", "Angle"],
    },
    TypeSchema {
        type_name: "Part::Sphere",
        attributes: &["Radius", "Angle1", "Angle2", "Angle3"],
    },
    TypeSchema {
        type_name: "Part::Cone",
        attributes: &["Radius1", "Radius2", "Height", "Angle"],
    },
    TypeSchema {
        type_name: "Part::Torus",
        attributes: &["Radius1", "Radius2", "Angle1", "Angle2", "Angle3"],
    },
    TypeSchema {
        type_name: "Part::Tube",
        attributes: &["InnerRadius", "OuterRadius", "Height"],
    },
    TypeSchema {
        type_name: "Part::Fillet",
        attributes: &["Base", "Edges", "Radius"],
    },
    TypeSchema {
        type_name: "Part::Chamfer",
        attributes: &["Base", "Edges", "Size"],
    },
    TypeSchema {
        type_name: "Part::Extrusion",
        attributes: &["Base", "LengthFwd", "LengthRev", "Solid", "Symmetric"],
    },
    TypeSchema {
        type_name: "Draft::Line",
        attributes: &["X1", "Y1", "Z1", "X2", "Y2", "Z2"],
    },
    TypeSchema {
        type_name: "Draft::Circle",
        attributes: &["Radius", "FirstAngle", "LastAngle"],
    },
    TypeSchema {
        type_name: "Draft::Ellipse",
        attributes: &["MajorRadius", "MinorRadius"],
    },
    TypeSchema {
        type_name: "Draft::Rectangle",
        attributes: &["Length", "Height", "FilletRadius"],
    },
    TypeSchema {
        type_name: "Draft::Polygon",
        attributes: &["FacesNumber", "Radius", "DrawMode"],
    },
    TypeSchema {
        type_name: "Sketcher::SketchObject",
        attributes: &["Geometry"],
    },
];

/// Look up the schema for a declared type name.
pub fn lookup(type_name: &str) -> Option<&'static TypeSchema> {
    TYPE_SCHEMAS.iter().find(|s| s.type_name == type_name)
}
