//! Region segmentation: outer boundary, door markers, room regions and interior walls

use image::GrayImage;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::SegmenterConfig;
use crate::connected_components::{label_components, label_mask, Component};
use crate::contours::{outer_contour, polygon_area, simplify_closed, simplify_polyline, to_points};
use crate::image_preprocessor::FloorPlanRaster;
use crate::types::{
    BoundaryContour, Color, DoorKind, DoorMarker, GeometricRegion, InteriorWall,
};

/// Everything the segmenter pulls out of one raster
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    pub boundary: BoundaryContour,
    /// Ordered by colour, then by first raster pixel
    pub rooms: Vec<GeometricRegion>,
    pub doors: Vec<DoorMarker>,
    pub interior_walls: Vec<InteriorWall>,
}

/// Run every extraction stage over one raster
pub fn segment(raster: &FloorPlanRaster, config: &SegmenterConfig) -> Segmentation {
    let wall_mask = raster.wall_mask(config.wall_gray_threshold);

    let boundary = extract_boundary(&wall_mask, config);
    let doors = detect_doors(raster, &wall_mask, config);
    let rooms = extract_rooms(raster, config);
    let interior_walls = extract_interior_walls(raster, config);

    debug!(
        "Segmented {}x{} raster: boundary={} rooms={} doors={} walls={}",
        raster.dimensions().0,
        raster.dimensions().1,
        boundary.points.len(),
        rooms.len(),
        doors.len(),
        interior_walls.len()
    );

    Segmentation {
        boundary,
        rooms,
        doors,
        interior_walls,
    }
}

/// Outline of the dark component enclosing the largest area
pub fn extract_boundary(wall_mask: &GrayImage, config: &SegmenterConfig) -> BoundaryContour {
    let map = label_mask(wall_mask);

    let mut candidates: Vec<&Component> = map.components().iter().collect();
    candidates.sort_by_key(|c| std::cmp::Reverse(c.width() as u64 * c.height() as u64));

    let mut best: Option<(f64, Vec<_>)> = None;
    for component in candidates {
        // A contour never encloses more than its bounding box
        let bbox_area = component.width() as f64 * component.height() as f64;
        if best.as_ref().is_some_and(|(area, _)| bbox_area <= *area) {
            break;
        }
        let contour = outer_contour(&map, component);
        let area = polygon_area(&to_points(&contour));
        if best.as_ref().map_or(true, |(best_area, _)| area > *best_area) {
            best = Some((area, contour));
        }
    }

    let Some((_, contour)) = best else {
        debug!("No wall pixels, boundary left empty");
        return BoundaryContour::default();
    };

    match simplify_closed(&contour, config.boundary_epsilon_ratio) {
        Some(points) => BoundaryContour { points },
        None => {
            warn!(
                "Boundary contour with {} points collapsed during simplification",
                contour.len()
            );
            BoundaryContour::default()
        }
    }
}

/// Bright red components inside the door size window
pub fn detect_doors(
    raster: &FloorPlanRaster,
    wall_mask: &GrayImage,
    config: &SegmenterConfig,
) -> Vec<DoorMarker> {
    let map = label_mask(&raster.door_mask());

    map.components()
        .iter()
        .filter(|c| c.area >= config.door_min_area && c.area < config.door_max_area)
        .map(|c| {
            let bounding_box = c.bounding_box();
            let kind = if touches_wall(c, wall_mask) {
                DoorKind::MainDoor
            } else {
                DoorKind::Door
            };
            DoorMarker {
                kind,
                area: c.area,
                bounding_box,
            }
        })
        .collect()
}

/// Center and the four edge midpoints (edges taken one past the box) tested against wall ink
fn touches_wall(component: &Component, wall_mask: &GrayImage) -> bool {
    let bbox = component.bounding_box();
    let (x, y, w, h) = (bbox.x, bbox.y, bbox.width, bbox.height);
    let (cx, cy) = (x + w / 2, y + h / 2);

    [(cx, cy), (x, cy), (x + w, cy), (cx, y), (cx, y + h)]
        .into_iter()
        .any(|(px, py)| {
            px < wall_mask.width() && py < wall_mask.height() && wall_mask.get_pixel(px, py)[0] > 0
        })
}

/// One region per same-colour connected component that survives the noise filters
pub fn extract_rooms(raster: &FloorPlanRaster, config: &SegmenterConfig) -> Vec<GeometricRegion> {
    let pixels = raster.pixels();
    let map = label_components(pixels, |p| {
        let color = Color::from(*p);
        !color.is_near_white(config.near_white) && !color.is_near_black(config.near_black)
    });

    let color_of = |c: &Component| Color::from(*pixels.get_pixel(c.seed.0, c.seed.1));

    let mut color_totals: HashMap<Color, usize> = HashMap::new();
    for component in map.components() {
        *color_totals.entry(color_of(component)).or_default() += component.area;
    }

    let mut regions = Vec::new();
    let mut skipped_noise = 0;
    for component in map.components() {
        let color = color_of(component);

        if color.is_bright_red()
            && color_totals.get(&color).copied().unwrap_or(0) < config.kitchen_red_min_area
        {
            continue;
        }
        if component.area < config.min_room_area {
            skipped_noise += 1;
            continue;
        }

        let bounding_box = component.bounding_box();
        let contour = outer_contour(&map, component);
        let polygon = simplify_closed(&contour, config.room_epsilon_ratio).unwrap_or_else(|| {
            debug!(
                "Region {} at {:?} fell back to its bounding box",
                color, component.seed
            );
            bounding_box.corners()
        });

        regions.push((
            component.seed,
            GeometricRegion {
                color,
                area: component.area,
                bounding_box,
                polygon,
                contour: to_points(&contour),
            },
        ));
    }

    debug!(
        "{} distinct colours, {} regions kept, {} noise components dropped",
        color_totals.len(),
        regions.len(),
        skipped_noise
    );

    // Components come out in seed raster order; a stable sort keeps it within each colour
    regions.sort_by_key(|(_, region)| region.color);
    regions.into_iter().map(|(_, region)| region).collect()
}

/// Thin near-white components, excluding the open background
pub fn extract_interior_walls(
    raster: &FloorPlanRaster,
    config: &SegmenterConfig,
) -> Vec<InteriorWall> {
    let map = label_mask(&raster.near_white_mask(config.near_white));

    map.components()
        .iter()
        .filter(|c| {
            c.area > config.min_wall_area
                && (c.width() < config.wall_max_thickness || c.height() < config.wall_max_thickness)
        })
        .filter_map(|c| {
            let contour = outer_contour(&map, c);
            let points = simplify_polyline(&contour, config.room_epsilon_ratio);
            (points.len() >= 2).then(|| InteriorWall {
                points,
                area: c.area,
                bounding_box: c.bounding_box(),
            })
        })
        .collect()
}
