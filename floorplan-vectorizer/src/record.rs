//! Structured room records produced by the external text parser

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, VectorizeError};

/// Lowercased, whitespace-normalised room type label (e.g. "master bedroom")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomType(String);

impl RoomType {
    pub fn new(label: &str) -> Result<Self> {
        let normalized = label
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if normalized.is_empty() {
            return Err(VectorizeError::InvalidRoomType(format!(
                "empty label {:?}",
                label
            )));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomType {
    type Error = VectorizeError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<RoomType> for String {
    fn from(value: RoomType) -> Self {
        value.0
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dimensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square_footage: Option<u32>,
}

impl Dimensions {
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.depth.is_none() && self.square_footage.is_none()
    }
}

/// One room as described in the text annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructuredRoom {
    #[serde(rename = "room")]
    pub room_type: RoomType,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub adjacent_rooms: Vec<String>,
    #[serde(default)]
    pub directions: Vec<String>,
}

impl StructuredRoom {
    pub fn new(room_type: RoomType) -> Self {
        Self {
            room_type,
            position: None,
            dimensions: None,
            adjacent_rooms: Vec::new(),
            directions: Vec::new(),
        }
    }

    pub fn with_square_footage(mut self, square_footage: u32) -> Self {
        self.dimensions
            .get_or_insert_with(Dimensions::default)
            .square_footage = Some(square_footage);
        self
    }

    pub fn with_position(mut self, position: &str) -> Self {
        self.position = Some(position.to_string());
        self
    }
}

/// Parsed floor plan annotation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FloorPlanRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub rooms: Vec<StructuredRoom>,
    #[serde(default)]
    pub total_rooms: usize,
    #[serde(default)]
    pub total_square_footage: Option<u32>,
    #[serde(default)]
    pub raw_text: Option<String>,
    /// Annotation and image paths stamped in by the dataset parser
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_annotation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_image: Option<String>,
}

impl FloorPlanRecord {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(VectorizeError::Record)
    }

    pub fn from_rooms(rooms: Vec<StructuredRoom>) -> Self {
        let total_square_footage = rooms
            .iter()
            .filter_map(|r| r.dimensions.as_ref().and_then(|d| d.square_footage))
            .sum::<u32>();
        Self {
            id: None,
            total_rooms: rooms.len(),
            total_square_footage: (total_square_footage > 0).then_some(total_square_footage),
            rooms,
            ..Self::default()
        }
    }

    /// Rooms grouped by type, input order kept within each group
    pub fn rooms_by_type(&self) -> HashMap<&str, Vec<&StructuredRoom>> {
        let mut groups: HashMap<&str, Vec<&StructuredRoom>> = HashMap::new();
        for room in &self.rooms {
            groups.entry(room.room_type.as_str()).or_default().push(room);
        }
        groups
    }
}
