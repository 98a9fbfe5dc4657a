use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::config::VectorizerConfig;
use crate::document::VectorDocument;
use crate::error::Result;
use crate::image_preprocessor::FloorPlanRaster;
use crate::palette::ColorPalette;
use crate::reconciler::reconcile;
use crate::record::FloorPlanRecord;
use crate::renderer::{Scene, VectorRenderer};
use crate::segmenter::segment;
use crate::types::{DoorKind, DoorMarker, ReconciledRoom};

/// Counts describing how much of the plan was recovered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    pub regions: usize,
    pub matched_rooms: usize,
    pub unknown_rooms: usize,
    pub doors: usize,
    pub main_doors: usize,
    pub interior_walls: usize,
    pub has_boundary: bool,
}

/// Result of converting one raster
#[derive(Debug, Clone)]
pub struct Conversion {
    pub document: VectorDocument,
    pub rooms: Vec<ReconciledRoom>,
    pub doors: Vec<DoorMarker>,
    pub stats: ConversionStats,
}

impl Conversion {
    pub fn to_svg(&self) -> String {
        self.document.to_svg()
    }
}

/// Raster + record + palette -> vector document.
///
/// Holds no per-run state, so one instance can serve many images from many threads.
#[derive(Debug, Clone)]
pub struct FloorPlanVectorizer {
    palette: ColorPalette,
    config: VectorizerConfig,
}

impl FloorPlanVectorizer {
    pub fn new(palette: ColorPalette, config: VectorizerConfig) -> Self {
        if palette.is_empty() {
            warn!("Empty colour palette, every region will be unknown");
        }
        Self { palette, config }
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn vectorize(&self, raster: &FloorPlanRaster, record: &FloorPlanRecord) -> Conversion {
        let segmentation = segment(raster, &self.config.segmenter);
        let rooms = reconcile(
            &segmentation.rooms,
            record,
            &self.palette,
            self.config.color_tolerance,
        );

        let scene = Scene {
            image_size: raster.dimensions(),
            boundary: &segmentation.boundary,
            rooms: &rooms,
            interior_walls: &segmentation.interior_walls,
            doors: &segmentation.doors,
            plan_id: record.id.as_deref(),
        };
        let document = VectorRenderer::new(self.config.render.clone()).render(&scene);

        let matched_rooms = rooms.iter().filter(|r| r.room_type.is_some()).count();
        let stats = ConversionStats {
            regions: segmentation.rooms.len(),
            matched_rooms,
            unknown_rooms: rooms.len() - matched_rooms,
            doors: segmentation.doors.len(),
            main_doors: segmentation
                .doors
                .iter()
                .filter(|d| d.kind == DoorKind::MainDoor)
                .count(),
            interior_walls: segmentation.interior_walls.len(),
            has_boundary: !segmentation.boundary.is_empty(),
        };

        if stats.regions == 0 {
            warn!(
                "No room regions found in plan {}",
                record.id.as_deref().unwrap_or("unknown")
            );
        }
        info!(
            "Vectorized plan {}: {} rooms ({} unknown), {} doors, {} walls, boundary={}",
            record.id.as_deref().unwrap_or("unknown"),
            stats.regions,
            stats.unknown_rooms,
            stats.doors,
            stats.interior_walls,
            stats.has_boundary
        );

        Conversion {
            document,
            rooms,
            doors: segmentation.doors,
            stats,
        }
    }

    pub fn vectorize_bytes(&self, bytes: &[u8], record: &FloorPlanRecord) -> Result<Conversion> {
        let raster = FloorPlanRaster::from_bytes(bytes)?;
        Ok(self.vectorize(&raster, record))
    }

    pub fn vectorize_path(&self, path: &Path, record: &FloorPlanRecord) -> Result<Conversion> {
        let raster = FloorPlanRaster::from_path(path)?;
        Ok(self.vectorize(&raster, record))
    }
}
