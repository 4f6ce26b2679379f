pub mod document;
pub mod schema;
pub mod value;

// Re-export commonly used types at the model level.
pub use document::{DocObject, Document, ViewProps, Workspace};
pub use schema::TypeSchema;
pub use value::{AttrValue, EdgeSpec, Placement, Rotation, SketchGeometry, Vector3};
