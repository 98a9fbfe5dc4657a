//! Room-type colour palette and tolerance-based colour classification

use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::path::Path;

use crate::error::{Result, VectorizeError};
use crate::record::RoomType;
use crate::types::Color;

/// Reference colour; `count` is how often sampling saw it (informational)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteColor {
    pub color: Color,
    pub count: Option<u32>,
}

impl From<Color> for PaletteColor {
    fn from(color: Color) -> Self {
        Self { color, count: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    pub room_type: RoomType,
    pub colors: Vec<PaletteColor>,
}

/// Room type -> reference colours, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorPalette {
    entries: Vec<PaletteEntry>,
}

/// Colour as written in palette JSON
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ColorSpec {
    Hex(String),
    Triple([u8; 3]),
    Sampled {
        #[serde(default)]
        hex: Option<String>,
        #[serde(default)]
        rgb: Option<[u8; 3]>,
        #[serde(default)]
        count: Option<u32>,
    },
}

impl ColorSpec {
    fn resolve(self) -> Result<PaletteColor> {
        match self {
            Self::Hex(hex) => Ok(parse_hex(&hex)?.into()),
            Self::Triple([r, g, b]) => Ok(Color::new(r, g, b).into()),
            Self::Sampled { hex, rgb, count } => {
                let color = match (rgb, hex) {
                    (Some([r, g, b]), _) => Color::new(r, g, b),
                    (None, Some(hex)) => parse_hex(&hex)?,
                    (None, None) => {
                        return Err(VectorizeError::InvalidColor(
                            "sampled colour needs `rgb` or `hex`".to_string(),
                        ))
                    }
                };
                Ok(PaletteColor { color, count })
            }
        }
    }
}

impl ColorPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a room type; colours for an already declared type extend that entry
    pub fn with_room(mut self, room_type: RoomType, colors: Vec<PaletteColor>) -> Self {
        self.push(room_type, colors);
        self
    }

    pub fn push(&mut self, room_type: RoomType, colors: Vec<PaletteColor>) {
        match self.entries.iter_mut().find(|e| e.room_type == room_type) {
            Some(entry) => entry.colors.extend(colors),
            None => self.entries.push(PaletteEntry { room_type, colors }),
        }
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.colors.is_empty())
    }

    /// Parse `{"room type": ["#rrggbb", [r, g, b], {"hex": .., "rgb": .., "count": ..}]}`
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Map<String, Value> =
            serde_json::from_str(json).map_err(|e| VectorizeError::Palette(e.to_string()))?;

        let mut palette = Self::new();
        for (label, colors) in raw {
            let specs: Vec<ColorSpec> = serde_json::from_value(colors).map_err(|e| {
                VectorizeError::Palette(format!("colours for {:?}: {}", label, e))
            })?;
            let colors = specs
                .into_iter()
                .map(ColorSpec::resolve)
                .collect::<Result<Vec<_>>>()?;
            palette.push(RoomType::new(&label)?, colors);
        }
        Ok(palette)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| VectorizeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Serialise in the sampled-record form accepted by `from_json`
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for entry in &self.entries {
            let colors = entry
                .colors
                .iter()
                .map(|c| {
                    json!({
                        "hex": c.color.to_hex(),
                        "rgb": [c.color.r, c.color.g, c.color.b],
                        "count": c.count.unwrap_or(0),
                    })
                })
                .collect();
            map.insert(entry.room_type.to_string(), Value::Array(colors));
        }
        Value::Object(map)
    }

    /// First room type (declaration order) with a colour within `tolerance` on every channel
    pub fn classify(&self, color: Color, tolerance: u8) -> Option<&RoomType> {
        self.entries
            .iter()
            .find(|entry| {
                entry
                    .colors
                    .iter()
                    .any(|reference| within_tolerance(color, reference.color, tolerance))
            })
            .map(|entry| &entry.room_type)
    }
}

fn within_tolerance(a: Color, b: Color, tolerance: u8) -> bool {
    a.r.abs_diff(b.r) <= tolerance && a.g.abs_diff(b.g) <= tolerance && a.b.abs_diff(b.b) <= tolerance
}

/// Parse `#rrggbb` / `rrggbb`
pub fn parse_hex(hex: &str) -> Result<Color> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(VectorizeError::InvalidColor(hex.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| VectorizeError::InvalidColor(hex.to_string()))
    };
    Ok(Color::new(channel(0)?, channel(2)?, channel(4)?))
}
