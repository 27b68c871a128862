//! Field values.

use hf_core::Handle;

/// Value held by one field of a record.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Real(f64),
    Integer(i64),
    /// Reference to another object's record.
    Pointer(Handle),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    pub fn as_pointer(&self) -> Option<Handle> {
        match self {
            FieldValue::Pointer(handle) => Some(*handle),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<Option<Handle>> for FieldValue {
    fn from(handle: Option<Handle>) -> Self {
        handle.map_or(FieldValue::Empty, FieldValue::Pointer)
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}
