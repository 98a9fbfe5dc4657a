use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::error::{Result, VectorizeError};

// Empirically tuned against the rendering style of the source dataset.
// Do not retune without a labelled validation set.

/// Grayscale level at or below which a pixel counts as wall ink
pub const WALL_GRAY_THRESHOLD: u8 = 30;
/// Boundary simplification tolerance as a fraction of contour perimeter
pub const BOUNDARY_EPSILON_RATIO: f64 = 0.002;
/// Room and wall simplification tolerance as a fraction of contour perimeter
pub const ROOM_EPSILON_RATIO: f64 = 0.01;
/// Channels all above this are background
pub const NEAR_WHITE: u8 = 240;
/// Channels all below this are wall ink
pub const NEAR_BLACK: u8 = 15;
/// Smallest red component (inclusive) accepted as a door
pub const DOOR_MIN_AREA: usize = 20;
/// Red components at or above this size are not doors
pub const DOOR_MAX_AREA: usize = 3000;
/// Bright red covering fewer pixels than this is door paint, not a kitchen fill
pub const KITCHEN_RED_MIN_AREA: usize = 3000;
/// Same-colour components smaller than this are noise
pub const MIN_ROOM_AREA: usize = 200;
/// A near-white component thinner than this on either axis is an interior wall
pub const WALL_MAX_THICKNESS: u32 = 15;
/// Interior wall components must be strictly larger than this
pub const MIN_WALL_AREA: usize = 50;
/// Per-channel tolerance for palette matching
pub const COLOR_TOLERANCE: u8 = 5;
pub const DEFAULT_CANVAS_WIDTH: u32 = 800;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;
/// Fraction of the canvas the scaled plan may occupy
pub const CANVAS_MARGIN: f64 = 0.9;

/// Thresholds used by the region segmenter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmenterConfig {
    #[serde(default = "default_wall_gray_threshold")]
    pub wall_gray_threshold: u8,
    #[serde(default = "default_boundary_epsilon_ratio")]
    pub boundary_epsilon_ratio: f64,
    #[serde(default = "default_room_epsilon_ratio")]
    pub room_epsilon_ratio: f64,
    #[serde(default = "default_near_white")]
    pub near_white: u8,
    #[serde(default = "default_near_black")]
    pub near_black: u8,
    #[serde(default = "default_door_min_area")]
    pub door_min_area: usize,
    #[serde(default = "default_door_max_area")]
    pub door_max_area: usize,
    #[serde(default = "default_kitchen_red_min_area")]
    pub kitchen_red_min_area: usize,
    #[serde(default = "default_min_room_area")]
    pub min_room_area: usize,
    #[serde(default = "default_wall_max_thickness")]
    pub wall_max_thickness: u32,
    #[serde(default = "default_min_wall_area")]
    pub min_wall_area: usize,
}

fn default_wall_gray_threshold() -> u8 {
    WALL_GRAY_THRESHOLD
}

fn default_boundary_epsilon_ratio() -> f64 {
    BOUNDARY_EPSILON_RATIO
}

fn default_room_epsilon_ratio() -> f64 {
    ROOM_EPSILON_RATIO
}

fn default_near_white() -> u8 {
    NEAR_WHITE
}

fn default_near_black() -> u8 {
    NEAR_BLACK
}

fn default_door_min_area() -> usize {
    DOOR_MIN_AREA
}

fn default_door_max_area() -> usize {
    DOOR_MAX_AREA
}

fn default_kitchen_red_min_area() -> usize {
    KITCHEN_RED_MIN_AREA
}

fn default_min_room_area() -> usize {
    MIN_ROOM_AREA
}

fn default_wall_max_thickness() -> u32 {
    WALL_MAX_THICKNESS
}

fn default_min_wall_area() -> usize {
    MIN_WALL_AREA
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            wall_gray_threshold: WALL_GRAY_THRESHOLD,
            boundary_epsilon_ratio: BOUNDARY_EPSILON_RATIO,
            room_epsilon_ratio: ROOM_EPSILON_RATIO,
            near_white: NEAR_WHITE,
            near_black: NEAR_BLACK,
            door_min_area: DOOR_MIN_AREA,
            door_max_area: DOOR_MAX_AREA,
            kitchen_red_min_area: KITCHEN_RED_MIN_AREA,
            min_room_area: MIN_ROOM_AREA,
            wall_max_thickness: WALL_MAX_THICKNESS,
            min_wall_area: MIN_WALL_AREA,
        }
    }
}

/// Canvas settings for the vector renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
    #[serde(default = "default_canvas_margin")]
    pub margin: f64,
}

fn default_canvas_width() -> u32 {
    DEFAULT_CANVAS_WIDTH
}

fn default_canvas_height() -> u32 {
    DEFAULT_CANVAS_HEIGHT
}

fn default_canvas_margin() -> f64 {
    CANVAS_MARGIN
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            margin: CANVAS_MARGIN,
        }
    }
}

impl RenderConfig {
    pub fn with_canvas(width: u32, height: u32) -> Self {
        Self {
            canvas_width: width,
            canvas_height: height,
            ..Self::default()
        }
    }
}

/// Top-level configuration for one vectorizer instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    #[serde(default)]
    pub segmenter: SegmenterConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default = "default_color_tolerance")]
    pub color_tolerance: u8,
}

fn default_color_tolerance() -> u8 {
    COLOR_TOLERANCE
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            segmenter: SegmenterConfig::default(),
            render: RenderConfig::default(),
            color_tolerance: COLOR_TOLERANCE,
        }
    }
}

impl VectorizerConfig {
    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(VectorizeError::Config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| VectorizeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Apply `CANVAS_WIDTH`, `CANVAS_HEIGHT` and `COLOR_TOLERANCE` overrides
    pub fn apply_env(mut self) -> Self {
        if let Some(width) = env_number::<u32>("CANVAS_WIDTH") {
            self.render.canvas_width = width;
        }
        if let Some(height) = env_number::<u32>("CANVAS_HEIGHT") {
            self.render.canvas_height = height;
        }
        if let Some(tolerance) = env_number::<u8>("COLOR_TOLERANCE") {
            self.color_tolerance = tolerance;
        }
        self
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring non-numeric {}={:?}", key, raw);
            None
        }
    }
}
