//! Floor plan raster -> layered vector document.
//!
//! Segments a colour-coded floor plan into room regions, door markers, the outer
//! boundary and interior walls, names the regions from a parsed room record, and
//! renders the result as a scaled SVG.

pub mod config;
pub mod connected_components;
pub mod contours;
pub mod document;
pub mod error;
pub mod image_preprocessor;
pub mod palette;
pub mod palette_extractor;
pub mod pipeline;
pub mod reconciler;
pub mod record;
pub mod renderer;
pub mod segmenter;
pub mod svg_inspect;
pub mod types;

pub use config::{RenderConfig, SegmenterConfig, VectorizerConfig};
pub use document::{Layer, LayerKind, VectorDocument};
pub use error::{Result, VectorizeError};
pub use image_preprocessor::FloorPlanRaster;
pub use palette::ColorPalette;
pub use pipeline::{Conversion, ConversionStats, FloorPlanVectorizer};
pub use record::{Dimensions, FloorPlanRecord, RoomType, StructuredRoom};
pub use types::{
    BoundaryContour, BoundingBox, Color, DoorKind, DoorMarker, GeometricRegion, InteriorWall,
    Point, ReconciledRoom,
};
