//! The in-memory reference host: named documents holding named objects with
//! typed, schema-gated attributes. Stands in for a real CAD kernel behind
//! the same narrow interface; `recompute` bumps a revision counter instead
//! of re-evaluating geometry.

use indexmap::IndexMap;

use crate::error::BridgeError;
use crate::model::schema::{self, TypeSchema};
use crate::model::value::{AttrValue, Placement};

/// Appearance state for one object. `extra` holds passthrough view
/// attributes assigned verbatim.
#[derive(Debug, Clone)]
pub struct ViewProps {
    pub visibility: bool,
    pub shape_color: Option<[f64; 4]>,
    pub extra: IndexMap<String, serde_json::Value>,
}

impl Default for ViewProps {
    fn default() -> Self {
        Self {
            visibility: true,
            shape_color: None,
            extra: IndexMap::new(),
        }
    }
}

/// One named object in a document.
#[derive(Debug, Clone)]
pub struct DocObject {
    name: String,
    type_name: String,
    /// Resolved once at creation; consulted for every catch-all assignment.
    schema: &'static TypeSchema,
    attrs: IndexMap<String, AttrValue>,
    placement: Placement,
    view: ViewProps,
}

impl DocObject {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Whether this object's type declares the given data attribute.
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.schema.recognizes(attribute)
    }

    pub fn attribute(&self, attribute: &str) -> Option<&AttrValue> {
        self.attrs.get(attribute)
    }

    /// Set a declared attribute. The caller is responsible for the schema
    /// check when one applies (the catch-all rule); link and edge
    /// assignments from the special-cased keys land here too.
    pub fn set_attribute(&mut self, attribute: impl Into<String>, value: AttrValue) {
        self.attrs.insert(attribute.into(), value);
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn set_placement(&mut self, placement: Placement) {
        self.placement = placement;
    }

    pub fn view(&self) -> &ViewProps {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewProps {
        &mut self.view
    }
}

/// A named document: an insertion-ordered set of objects plus a revision
/// counter advanced by `recompute`.
#[derive(Debug, Clone, Default)]
pub struct Document {
    name: String,
    objects: IndexMap<String, DocObject>,
    revision: u64,
}

impl Document {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create an object of the declared type. Fails for unknown types
    /// (no schema to gate attributes against) and duplicate names.
    pub fn add_object(
        &mut self,
        type_name: &str,
        name: &str,
    ) -> Result<&mut DocObject, BridgeError> {
        let schema = schema::lookup(type_name).ok_or_else(|| BridgeError::Execution {
            message: format!("Unknown object type '{type_name}'"),
        })?;
        if self.objects.contains_key(name) {
            return Err(BridgeError::Execution {
                message: format!("Object '{name}' already exists in document '{}'", self.name),
            });
        }
        let object = DocObject {
            name: name.to_string(),
            type_name: type_name.to_string(),
            schema,
            attrs: IndexMap::new(),
            placement: Placement::default(),
            view: ViewProps::default(),
        };
        Ok(self.objects.entry(name.to_string()).or_insert(object))
    }

    pub fn get_object(&self, name: &str) -> Option<&DocObject> {
        self.objects.get(name)
    }

    pub fn get_object_mut(&mut self, name: &str) -> Option<&mut DocObject> {
        self.objects.get_mut(name)
    }

    pub fn remove_object(&mut self, name: &str) -> Result<(), BridgeError> {
        self.objects
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(|| BridgeError::NotFound {
                what: format!("Object '{name}'"),
            })
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Re-evaluate dependent state after attribute changes. The reference
    /// host has no geometry kernel; the revision counter lets tests and
    /// diagnostics observe that a recompute happened.
    pub fn recompute(&mut self) {
        self.revision += 1;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// The root of the reference host: all open documents, insertion-ordered.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    documents: IndexMap<String, Document>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_document(&mut self, name: &str) -> Result<&mut Document, BridgeError> {
        if self.documents.contains_key(name) {
            return Err(BridgeError::Execution {
                message: format!("Document '{name}' already exists"),
            });
        }
        let document = Document {
            name: name.to_string(),
            ..Document::default()
        };
        Ok(self.documents.entry(name.to_string()).or_insert(document))
    }

    pub fn get_document(&self, name: &str) -> Option<&Document> {
        self.documents.get(name)
    }

    pub fn get_document_mut(&mut self, name: &str) -> Option<&mut Document> {
        self.documents.get_mut(name)
    }

    pub fn list_documents(&self) -> Vec<String> {
        self.documents.keys().cloned().collect()
    }

    /// Run a newline-separated directive script against the workspace.
    ///
    /// Directives:
    ///   `new_document NAME`
    ///   `new_object DOC NAME TYPE`
    ///   `delete_object DOC NAME`
    ///   `set DOC OBJECT ATTR JSON_VALUE`
    ///   `recompute DOC`
    /// Blank lines and lines starting with `#` are skipped. The first
    /// failing line aborts the script; earlier directives are not rolled
    /// back.
    pub fn run_script(&mut self, source: &str) -> Result<(), BridgeError> {
        for (lineno, raw) in source.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.run_directive(line).map_err(|e| BridgeError::Execution {
                message: format!("script line {}: {e}", lineno + 1),
            })?;
        }
        Ok(())
    }

    fn run_directive(&mut self, line: &str) -> Result<(), BridgeError> {
        let mut parts = line.splitn(5, char::is_whitespace).filter(|s| !s.is_empty());
        let verb = parts.next().unwrap_or_default();
        match verb {
            "new_document" => {
                let name = next_word(&mut parts, "document name")?;
                let doc = self.new_document(name)?;
                doc.recompute();
                Ok(())
            }
            "new_object" => {
                let doc_name = next_word(&mut parts, "document name")?;
                let obj_name = next_word(&mut parts, "object name")?;
                let type_name = next_word(&mut parts, "object type")?;
                let doc = self.require_document_mut(doc_name)?;
                doc.add_object(type_name, obj_name)?;
                doc.recompute();
                Ok(())
            }
            "delete_object" => {
                let doc_name = next_word(&mut parts, "document name")?;
                let obj_name = next_word(&mut parts, "object name")?;
                let doc = self.require_document_mut(doc_name)?;
                doc.remove_object(obj_name)?;
                doc.recompute();
                Ok(())
            }
            "set" => {
                let doc_name = next_word(&mut parts, "document name")?;
                let obj_name = next_word(&mut parts, "object name")?;
                let attr = next_word(&mut parts, "attribute name")?.to_string();
                let json = parts.next().ok_or_else(|| BridgeError::Execution {
                    message: "missing value".to_string(),
                })?;
                let value: serde_json::Value =
                    serde_json::from_str(json).map_err(|e| BridgeError::Execution {
                        message: format!("invalid value: {e}"),
                    })?;
                let doc = self.require_document_mut(doc_name)?;
                let object =
                    doc.get_object_mut(obj_name)
                        .ok_or_else(|| BridgeError::NotFound {
                            what: format!("Object '{obj_name}'"),
                        })?;
                if !object.has_attribute(&attr) {
                    return Err(BridgeError::Execution {
                        message: format!(
                            "'{}' has no attribute '{attr}'",
                            object.type_name()
                        ),
                    });
                }
                let typed = AttrValue::from_json(&value).ok_or_else(|| BridgeError::Execution {
                    message: format!("unsupported value for '{attr}'"),
                })?;
                object.set_attribute(attr, typed);
                doc.recompute();
                Ok(())
            }
            "recompute" => {
                let doc_name = next_word(&mut parts, "document name")?;
                self.require_document_mut(doc_name)?.recompute();
                Ok(())
            }
            other => Err(BridgeError::Execution {
                message: format!("unknown directive '{other}'"),
            }),
        }
    }

    fn require_document_mut(&mut self, name: &str) -> Result<&mut Document, BridgeError> {
        self.get_document_mut(name).ok_or_else(|| BridgeError::NotFound {
            what: format!("Document '{name}'"),
        })
    }
}

fn next_word<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    what: &str,
) -> Result<&'a str, BridgeError> {
    parts.next().ok_or_else(|| BridgeError::Execution {
        message: format!("missing {what}"),
    })
}
