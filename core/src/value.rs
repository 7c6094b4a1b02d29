//! Scalar-or-list property values and their on-disk encoding.
//!
//! The wire format is self-describing JSON: every value carries its own
//! variant tag, so decode is always type-preserving — there is no untyped
//! "bare number" path in this encoding (see DESIGN.md for why this differs
//! slightly from the historical source behavior it's grounded on).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Maximum length, in bytes, of a short [`PropValue::Str`].
pub const MAX_SHORT_STRING_BYTES: usize = 255;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum PropValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    Str(String),
    BoolList(Vec<bool>),
    IntList(Vec<i64>),
    FloatList(Vec<f64>),
    TimestampList(Vec<i64>),
    StrList(Vec<String>),
}

impl PropValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropValue::Bool(_) => "bool",
            PropValue::Int(_) => "int",
            PropValue::Float(_) => "float",
            PropValue::Timestamp(_) => "timestamp",
            PropValue::Str(_) => "string",
            PropValue::BoolList(_) => "bool-list",
            PropValue::IntList(_) => "int-list",
            PropValue::FloatList(_) => "float-list",
            PropValue::TimestampList(_) => "timestamp-list",
            PropValue::StrList(_) => "string-list",
        }
    }

    /// A short string (scalar or each element of a list) must be at most
    /// 255 bytes.
    pub(crate) fn check_short_string_len(&self) -> Result<(), GraphError> {
        match self {
            PropValue::Str(s) if s.len() > MAX_SHORT_STRING_BYTES => Err(GraphError::StringTooLong),
            PropValue::StrList(list) if list.iter().any(|s| s.len() > MAX_SHORT_STRING_BYTES) => {
                Err(GraphError::StringTooLong)
            }
            _ => Ok(()),
        }
    }
}

pub type PropMap = BTreeMap<String, PropValue>;
/// A property payload to save: `None` means "delete this key" (the merge
/// contract of `Store::save_node_properties`).
pub type PropPatch = BTreeMap<String, Option<PropValue>>;
pub type TextMap = BTreeMap<String, String>;
pub type BlobMap = BTreeMap<String, Vec<u8>>;
/// Edges file contents: target id string -> property-node id string (empty
/// when the edge carries no properties).
pub type EdgeMap = BTreeMap<String, String>;

pub fn encode_properties(map: &PropMap) -> Result<Vec<u8>, GraphError> {
    serde_json::to_vec(map).map_err(|e| GraphError::Backend(crate::error::BackendError::new(e)))
}

pub fn decode_properties(bytes: &[u8]) -> Result<PropMap, GraphError> {
    serde_json::from_slice(bytes).map_err(|e| GraphError::Backend(crate::error::BackendError::new(e)))
}

pub fn encode_edges(map: &EdgeMap) -> Result<Vec<u8>, GraphError> {
    serde_json::to_vec(map).map_err(|e| GraphError::Backend(crate::error::BackendError::new(e)))
}

pub fn decode_edges(bytes: &[u8]) -> Result<EdgeMap, GraphError> {
    serde_json::from_slice(bytes).map_err(|e| GraphError::Backend(crate::error::BackendError::new(e)))
}
