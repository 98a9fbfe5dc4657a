//! Geometric entities produced by segmentation and reconciliation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::Dimensions;

/// Point in image (or canvas) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Exact 8-bit RGB colour of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// All channels strictly above `level`
    pub fn is_near_white(&self, level: u8) -> bool {
        self.r > level && self.g > level && self.b > level
    }

    /// All channels strictly below `level`
    pub fn is_near_black(&self, level: u8) -> bool {
        self.r < level && self.g < level && self.b < level
    }

    /// Door paint: R>200, G<50, B<50
    pub fn is_bright_red(&self) -> bool {
        self.r > 200 && self.g < 50 && self.b < 50
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(pixel: image::Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Axis-aligned pixel extent; `width`/`height` count pixels, so a single pixel is 1x1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Build from inclusive min/max pixel coordinates
    pub fn from_extents(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Corner points, clockwise from top-left
    pub fn corners(&self) -> Vec<Point> {
        let (x, y) = (self.x as f64, self.y as f64);
        let (w, h) = (self.width as f64, self.height as f64);
        vec![
            Point::new(x, y),
            Point::new(x + w, y),
            Point::new(x + w, y + h),
            Point::new(x, y + h),
        ]
    }
}

/// One connected same-colour component that survived the noise filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometricRegion {
    pub color: Color,
    /// Pixel count
    pub area: usize,
    pub bounding_box: BoundingBox,
    /// Simplified outline, at least three points
    pub polygon: Vec<Point>,
    /// Unsimplified outer border
    pub contour: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorKind {
    /// Touches the outer wall
    MainDoor,
    Door,
}

impl DoorKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MainDoor => "main door",
            Self::Door => "door",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorMarker {
    pub kind: DoorKind,
    pub area: usize,
    pub bounding_box: BoundingBox,
}

/// Outer wall outline; empty when the raster has no dark boundary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryContour {
    pub points: Vec<Point>,
}

impl BoundaryContour {
    pub fn is_empty(&self) -> bool {
        self.points.len() < 3
    }
}

/// Thin near-white divider between rooms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteriorWall {
    pub points: Vec<Point>,
    pub area: usize,
    pub bounding_box: BoundingBox,
}

/// A region with its assigned name and any attributes pulled from the record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRoom {
    pub region: GeometricRegion,
    /// Unique within one floor plan
    pub name: String,
    /// Palette label, `None` for unknown colours
    pub room_type: Option<String>,
    pub dimensions: Option<Dimensions>,
    pub position: Option<String>,
}

impl ReconciledRoom {
    pub fn square_footage(&self) -> Option<u32> {
        self.dimensions.as_ref().and_then(|d| d.square_footage)
    }
}
