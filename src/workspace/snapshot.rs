//! Serializable workspace snapshot types.
//!
//! The engine treats figure data as opaque: every object record carries a
//! stable `id` and an arbitrary set of JSON fields. Two records are the
//! "same object" when their ids match and "unchanged" when every field is
//! equal.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The three object collections that take part in history compaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Shape,
    Segment,
    Point,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 3] = [ObjectKind::Shape, ObjectKind::Segment, ObjectKind::Point];

    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::Shape => "shape",
            ObjectKind::Segment => "segment",
            ObjectKind::Point => "point",
        }
    }
}

/// Full field data for one shape, segment or point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectData {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ObjectData {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }
}

/// "Identical to the object with this id in history entry `index_of_reference`"
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BackReference {
    pub id: String,
    pub index_of_reference: usize,
}

/// One slot of an object collection: either full data or a back-reference.
///
/// Serialized untagged so stored documents keep the `{ id, indexOfReference }`
/// shape for compacted slots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectRecord {
    Reference(BackReference),
    Full(ObjectData),
}

impl ObjectRecord {
    pub fn id(&self) -> &str {
        match self {
            ObjectRecord::Reference(r) => &r.id,
            ObjectRecord::Full(data) => &data.id,
        }
    }

    pub fn as_full(&self) -> Option<&ObjectData> {
        match self {
            ObjectRecord::Full(data) => Some(data),
            ObjectRecord::Reference(_) => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, ObjectRecord::Reference(_))
    }
}

impl From<ObjectData> for ObjectRecord {
    fn from(data: ObjectData) -> Self {
        ObjectRecord::Full(data)
    }
}

/// Shapes, segments and points of one canvas layer
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectCollections {
    #[serde(default)]
    pub shapes_data: Vec<ObjectRecord>,
    #[serde(default)]
    pub segments_data: Vec<ObjectRecord>,
    #[serde(default)]
    pub points_data: Vec<ObjectRecord>,
}

impl ObjectCollections {
    pub fn records(&self, kind: ObjectKind) -> &[ObjectRecord] {
        match kind {
            ObjectKind::Shape => &self.shapes_data,
            ObjectKind::Segment => &self.segments_data,
            ObjectKind::Point => &self.points_data,
        }
    }

    pub fn records_mut(&mut self, kind: ObjectKind) -> &mut Vec<ObjectRecord> {
        match kind {
            ObjectKind::Shape => &mut self.shapes_data,
            ObjectKind::Segment => &mut self.segments_data,
            ObjectKind::Point => &mut self.points_data,
        }
    }

    /// Find the record with the given id
    pub fn find(&self, kind: ObjectKind, id: &str) -> Option<&ObjectRecord> {
        self.records(kind).iter().find(|record| record.id() == id)
    }

    pub fn len(&self) -> usize {
        ObjectKind::ALL.iter().map(|kind| self.records(*kind).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of back-references across all three collections
    pub fn reference_count(&self) -> usize {
        ObjectKind::ALL
            .iter()
            .flat_map(|kind| self.records(*kind))
            .filter(|record| record.is_reference())
            .count()
    }
}

/// View translation of the plane
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

fn default_zoom() -> f64 {
    1.0
}

/// A complete copy of the editable workspace state at one instant
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub objects: ObjectCollections,
    /// Tangram silhouette layer, never compacted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_objects: Option<ObjectCollections>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shape_groups: Vec<Value>,
    #[serde(default = "default_zoom")]
    pub zoom_level: f64,
    #[serde(default)]
    pub translate_offset: Offset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_size: Option<CanvasSize>,
}

impl Default for WorkspaceSnapshot {
    fn default() -> Self {
        Self {
            id: None,
            objects: ObjectCollections::default(),
            back_objects: None,
            shape_groups: Vec::new(),
            zoom_level: default_zoom(),
            translate_offset: Offset::default(),
            canvas_size: None,
        }
    }
}

fn default_grid_type() -> String {
    "none".to_string()
}

fn default_grid_size() -> f64 {
    1.0
}

/// Settings that travel with every history entry and checkpoint.
///
/// Unknown settings (tangram state, environment specific flags) are kept in
/// `extra` so they survive a round trip untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    #[serde(default)]
    pub grid_shown: bool,
    #[serde(default = "default_grid_type")]
    pub grid_type: String,
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            grid_shown: false,
            grid_type: default_grid_type(),
            grid_size: default_grid_size(),
            extra: Map::new(),
        }
    }
}
