//! Outer borders of labelled components and their polygon simplification

use geo::{Area, Coord, LineString, Polygon as GeoPolygon};
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point as PixelPoint;

use crate::connected_components::{Component, LabelMap};
use crate::types::Point;

/// Outer border of one component, in image coordinates
pub fn outer_contour(map: &LabelMap, component: &Component) -> Vec<PixelPoint<i32>> {
    let (mask, (origin_x, origin_y)) = map.component_mask(component, 1);

    // The crop holds exactly one 8-connected blob, so it has one outermost border
    find_contours::<i32>(&mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .max_by_key(|c| c.points.len())
        .map(|c| {
            c.points
                .into_iter()
                .map(|p| PixelPoint::new(p.x + origin_x as i32, p.y + origin_y as i32))
                .collect()
        })
        .unwrap_or_default()
}

/// Closed-curve perimeter
pub fn perimeter(contour: &[PixelPoint<i32>]) -> f64 {
    if contour.len() < 2 {
        return 0.0;
    }
    arc_length(contour, true)
}

/// Douglas-Peucker with tolerance `ratio * perimeter`.
///
/// Returns `None` when the contour is degenerate or fewer than three vertices survive.
pub fn simplify_closed(contour: &[PixelPoint<i32>], ratio: f64) -> Option<Vec<Point>> {
    if contour.len() < 3 {
        return None;
    }
    let epsilon = ratio * perimeter(contour);
    if epsilon <= 0.0 {
        return None;
    }

    let mut simplified = approximate_polygon_dp(contour, epsilon, true);
    // Closed approximation repeats the first vertex at the end
    while simplified.len() > 1 && simplified.first() == simplified.last() {
        simplified.pop();
    }

    let points = drop_collinear(to_points(&simplified), epsilon);

    (points.len() >= 3).then_some(points)
}

/// Same tolerance rule as `simplify_closed`, for outlines drawn as polylines.
/// Degenerate input is passed through instead of rejected.
pub fn simplify_polyline(contour: &[PixelPoint<i32>], ratio: f64) -> Vec<Point> {
    let epsilon = ratio * perimeter(contour);
    if contour.len() < 3 || epsilon <= 0.0 {
        return to_points(contour);
    }
    let mut simplified = approximate_polygon_dp(contour, epsilon, true);
    while simplified.len() > 1 && simplified.first() == simplified.last() {
        simplified.pop();
    }
    to_points(&simplified)
}

/// Remove vertices lying within `epsilon` of the chord between their neighbours
fn drop_collinear(mut points: Vec<Point>, epsilon: f64) -> Vec<Point> {
    let mut changed = true;
    while changed && points.len() > 3 {
        changed = false;
        for i in 0..points.len() {
            let n = points.len();
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            if perpendicular_distance(&points[i], &prev, &next) <= epsilon {
                points.remove(i);
                changed = true;
                break;
            }
        }
    }
    points
}

fn perpendicular_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    let length = a.distance_to(b);
    if length == 0.0 {
        return p.distance_to(a);
    }
    ((b.x - a.x) * (a.y - p.y) - (a.x - p.x) * (b.y - a.y)).abs() / length
}

/// Enclosed area via the shoelace formula
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let coords: Vec<Coord> = points.iter().map(|p| Coord { x: p.x, y: p.y }).collect();

    let line_string = LineString::from(coords);
    let polygon = GeoPolygon::new(line_string, vec![]);

    polygon.unsigned_area()
}

pub fn to_points(contour: &[PixelPoint<i32>]) -> Vec<Point> {
    contour
        .iter()
        .map(|p| Point::new(p.x as f64, p.y as f64))
        .collect()
}
