use tracing::debug;

use crate::config::RenderConfig;
use crate::document::{element_id, title_case, Element, Layer, LayerKind, Shape, Style, VectorDocument};
use crate::reconciler::OrdinalNamer;
use crate::types::{BoundaryContour, BoundingBox, DoorKind, DoorMarker, InteriorWall, Point, ReconciledRoom};

const BOUNDARY_STROKE: f64 = 4.0;
const WALL_STROKE: f64 = 3.0;
const ROOM_STROKE: f64 = 1.5;
const ROOM_FILL_OPACITY: f64 = 0.7;
/// Vertical gap between a room's name and its square-footage label
const AREA_LABEL_OFFSET: f64 = 18.0;
const TITLE_BASELINE: f64 = 30.0;

/// Uniform image -> canvas mapping that centres the plan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Transform {
    pub fn fit(image_size: (u32, u32), config: &RenderConfig) -> Self {
        let image_width = image_size.0.max(1) as f64;
        let image_height = image_size.1.max(1) as f64;
        let canvas_width = config.canvas_width as f64;
        let canvas_height = config.canvas_height as f64;

        let scale = (canvas_width / image_width).min(canvas_height / image_height) * config.margin;
        Self {
            scale,
            offset_x: (canvas_width - image_width * scale) / 2.0,
            offset_y: (canvas_height - image_height * scale) / 2.0,
        }
    }

    pub fn point(&self, p: &Point) -> Point {
        Point::new(p.x * self.scale + self.offset_x, p.y * self.scale + self.offset_y)
    }

    pub fn points(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.point(p)).collect()
    }

    pub fn rect(&self, bbox: &BoundingBox) -> Shape {
        let origin = self.point(&Point::new(bbox.x as f64, bbox.y as f64));
        Shape::Rect {
            x: origin.x,
            y: origin.y,
            width: bbox.width as f64 * self.scale,
            height: bbox.height as f64 * self.scale,
        }
    }
}

/// Everything drawn for one floor plan, in image coordinates
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub image_size: (u32, u32),
    pub boundary: &'a BoundaryContour,
    pub rooms: &'a [ReconciledRoom],
    pub interior_walls: &'a [InteriorWall],
    pub doors: &'a [DoorMarker],
    /// Shown in the title; `unknown` when absent
    pub plan_id: Option<&'a str>,
}

pub struct VectorRenderer {
    config: RenderConfig,
}

impl VectorRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Background, boundary, interior walls, rooms (largest first), doors, title
    pub fn render(&self, scene: &Scene) -> VectorDocument {
        let transform = Transform::fit(scene.image_size, &self.config);
        let mut document = VectorDocument::new(self.config.canvas_width, self.config.canvas_height);

        document.push(self.background());
        if let Some(layer) = boundary_layer(scene.boundary, &transform) {
            document.push(layer);
        }
        if let Some(layer) = walls_layer(scene.interior_walls, &transform) {
            document.push(layer);
        }

        let mut rooms: Vec<&ReconciledRoom> = scene.rooms.iter().collect();
        rooms.sort_by(|a, b| b.region.area.cmp(&a.region.area));
        for room in rooms {
            document.push(room_layer(room, &transform));
        }

        let mut namer = OrdinalNamer::new();
        for door in scene.doors {
            let (_, name) = namer.next(door.kind.label());
            document.push(door_layer(door, name, &transform));
        }

        document.push(self.title(scene.plan_id));

        debug!(
            "Rendered {} layers at scale {:.3} (offset {:.1}, {:.1})",
            document.layers.len(),
            transform.scale,
            transform.offset_x,
            transform.offset_y
        );
        document
    }

    fn background(&self) -> Layer {
        let mut layer = Layer::new(LayerKind::Background);
        layer.push(Element::new(
            Shape::Rect {
                x: 0.0,
                y: 0.0,
                width: self.config.canvas_width as f64,
                height: self.config.canvas_height as f64,
            },
            Style::filled("white"),
        ));
        layer
    }

    fn title(&self, plan_id: Option<&str>) -> Layer {
        let mut layer = Layer::new(LayerKind::Title);
        let style = Style {
            dominant_baseline: None,
            ..Style::label(18.0, true, "black")
        };
        layer.push(
            Element::new(
                Shape::Text {
                    x: self.config.canvas_width as f64 / 2.0,
                    y: TITLE_BASELINE,
                    content: format!("Floor Plan - ID: {}", plan_id.unwrap_or("unknown")),
                },
                style,
            )
            .with_id("title"),
        );
        layer
    }
}

fn boundary_layer(boundary: &BoundaryContour, transform: &Transform) -> Option<Layer> {
    if boundary.is_empty() {
        return None;
    }
    let mut layer = Layer::new(LayerKind::Boundary);
    layer.push(
        Element::new(
            Shape::Polygon(transform.points(&boundary.points)),
            Style {
                stroke_linejoin: Some("miter"),
                stroke_linecap: Some("butt"),
                ..Style::stroked("black", BOUNDARY_STROKE)
            },
        )
        .with_id("floor_plan_boundary"),
    );
    Some(layer)
}

fn walls_layer(walls: &[InteriorWall], transform: &Transform) -> Option<Layer> {
    if walls.is_empty() {
        return None;
    }
    let mut layer = Layer::group(LayerKind::InteriorWalls, "inner_walls");
    for wall in walls {
        layer.push(Element::new(
            Shape::Polyline(transform.points(&wall.points)),
            Style {
                stroke_linecap: Some("round"),
                stroke_linejoin: Some("miter"),
                ..Style::stroked("white", WALL_STROKE)
            },
        ));
    }
    Some(layer)
}

fn room_layer(room: &ReconciledRoom, transform: &Transform) -> Layer {
    let region = &room.region;
    let mut layer = Layer::group(LayerKind::Room, element_id("room_", &room.name)).with_name(&room.name);

    let shape = if region.polygon.len() >= 3 {
        Shape::Polygon(transform.points(&region.polygon))
    } else {
        transform.rect(&region.bounding_box)
    };
    layer.push(Element::new(
        shape,
        Style {
            fill: Some(region.color.to_string()),
            fill_opacity: Some(ROOM_FILL_OPACITY),
            ..Style::stroked("black", ROOM_STROKE)
        },
    ));

    let center = transform.point(&region.bounding_box.center());
    layer.push(Element::new(
        Shape::Text {
            x: center.x,
            y: center.y,
            content: title_case(&room.name),
        },
        Style::label(12.0, true, "black"),
    ));
    if let Some(square_footage) = room.square_footage() {
        layer.push(Element::new(
            Shape::Text {
                x: center.x,
                y: center.y + AREA_LABEL_OFFSET,
                content: format!("{} sq ft", square_footage),
            },
            Style::label(10.0, false, "black"),
        ));
    }
    layer
}

fn door_layer(door: &DoorMarker, name: String, transform: &Transform) -> Layer {
    let main = door.kind == DoorKind::MainDoor;
    let mut layer = Layer::group(LayerKind::Door, element_id("", &name)).with_name(name);

    let label_at = transform.point(&door.bounding_box.center());
    layer.push(Element::new(
        transform.rect(&door.bounding_box),
        Style {
            fill: Some("red".to_string()),
            fill_opacity: Some(if main { 0.9 } else { 0.7 }),
            stroke: Some("darkred".to_string()),
            stroke_width: Some(if main { 3.0 } else { 2.0 }),
            ..Style::default()
        },
    ));
    layer.push(Element::new(
        Shape::Text {
            x: label_at.x,
            y: label_at.y,
            content: title_case(door.kind.label()),
        },
        Style::label(if main { 9.0 } else { 8.0 }, true, "white"),
    ));
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Dimensions;
    use crate::types::{Color, GeometricRegion};
    use approx::assert_relative_eq;

    fn room(name: &str, x: u32, size: u32, square_footage: Option<u32>) -> ReconciledRoom {
        let bounding_box = BoundingBox {
            x,
            y: 10,
            width: size,
            height: size,
        };
        ReconciledRoom {
            region: GeometricRegion {
                color: Color::new(255, 165, 0),
                area: (size * size) as usize,
                bounding_box,
                polygon: bounding_box.corners(),
                contour: Vec::new(),
            },
            name: name.to_string(),
            room_type: Some(name.to_string()),
            dimensions: square_footage.map(|sf| Dimensions {
                square_footage: Some(sf),
                ..Dimensions::default()
            }),
            position: None,
        }
    }

    fn door(kind: DoorKind, x: u32) -> DoorMarker {
        DoorMarker {
            kind,
            area: 100,
            bounding_box: BoundingBox {
                x,
                y: 0,
                width: 10,
                height: 10,
            },
        }
    }

    fn render(rooms: &[ReconciledRoom], doors: &[DoorMarker], canvas: (u32, u32)) -> VectorDocument {
        render_with_walls(rooms, &[], doors, canvas)
    }

    fn render_with_walls(
        rooms: &[ReconciledRoom],
        walls: &[InteriorWall],
        doors: &[DoorMarker],
        canvas: (u32, u32),
    ) -> VectorDocument {
        let boundary = BoundaryContour {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(199.0, 0.0),
                Point::new(199.0, 99.0),
                Point::new(0.0, 99.0),
            ],
        };
        let scene = Scene {
            image_size: (200, 100),
            boundary: &boundary,
            rooms,
            interior_walls: walls,
            doors,
            plan_id: Some("42"),
        };
        let config = RenderConfig::with_canvas(canvas.0, canvas.1);
        VectorRenderer::new(config).render(&scene)
    }

    #[test]
    fn test_transform_fits_and_centres() {
        let config = RenderConfig::default();
        let transform = Transform::fit((200, 100), &config);
        // min(800/200, 600/100) * 0.9
        assert_relative_eq!(transform.scale, 3.6);
        assert_relative_eq!(transform.offset_x, 40.0);
        assert_relative_eq!(transform.offset_y, 120.0);
        let p = transform.point(&Point::new(100.0, 50.0));
        assert_relative_eq!(p.x, 400.0);
        assert_relative_eq!(p.y, 300.0);
    }

    #[test]
    fn test_layer_order_and_room_sorting() {
        let rooms = vec![room("bathroom", 10, 20, None), room("living room", 50, 40, None)];
        let doc = render(&rooms, &[door(DoorKind::Door, 150)], (800, 600));

        let kinds: Vec<LayerKind> = doc.layers.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LayerKind::Background,
                LayerKind::Boundary,
                LayerKind::Room,
                LayerKind::Room,
                LayerKind::Door,
                LayerKind::Title
            ]
        );
        let names: Vec<&str> = doc.room_layers().filter_map(|l| l.name.as_deref()).collect();
        assert_eq!(names, vec!["living room", "bathroom"]);
    }

    #[test]
    fn test_interior_walls_between_boundary_and_rooms() {
        let wall = InteriorWall {
            points: vec![Point::new(100.0, 0.0), Point::new(100.0, 99.0)],
            area: 300,
            bounding_box: BoundingBox {
                x: 99,
                y: 0,
                width: 3,
                height: 100,
            },
        };
        let rooms = vec![room("kitchen", 10, 30, None)];
        let doc = render_with_walls(&rooms, &[wall], &[], (800, 600));

        let kinds: Vec<LayerKind> = doc.layers.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LayerKind::Background,
                LayerKind::Boundary,
                LayerKind::InteriorWalls,
                LayerKind::Room,
                LayerKind::Title
            ]
        );

        let walls = doc.find_layer("inner_walls").unwrap();
        assert_eq!(walls.kind, LayerKind::InteriorWalls);
        assert_eq!(walls.elements.len(), 1);
        let Shape::Polyline(points) = &walls.elements[0].shape else {
            panic!("wall should be a polyline");
        };
        // Scale 3.6, offset (40, 120)
        assert_relative_eq!(points[0].x, 400.0);
        assert_relative_eq!(points[0].y, 120.0);
        assert_relative_eq!(points[1].y, 476.4, epsilon = 1e-9);

        let style = &walls.elements[0].style;
        assert_eq!(style.stroke.as_deref(), Some("white"));
        assert_eq!(style.stroke_width, Some(3.0));
        assert_eq!(style.stroke_linecap, Some("round"));
        assert_eq!(style.fill.as_deref(), Some("none"));

        let svg = doc.to_svg();
        let walls_at = svg.find(r#"<g id="inner_walls">"#).unwrap();
        assert!(svg.find("floor_plan_boundary").unwrap() < walls_at);
        assert!(walls_at < svg.find("room_kitchen").unwrap());
        assert!(svg.contains("<polyline"));
    }

    #[test]
    fn test_room_labels_and_style() {
        let doc = render(&[room("master bedroom 2", 10, 30, Some(120))], &[], (800, 600));
        let layer = doc.find_layer("room_master_bedroom_2").unwrap();

        let labels: Vec<&str> = layer.labels().collect();
        assert_eq!(labels, vec!["Master Bedroom 2", "120 sq ft"]);

        let style = &layer.elements[0].style;
        assert_eq!(style.fill.as_deref(), Some("rgb(255,165,0)"));
        assert_eq!(style.fill_opacity, Some(0.7));
        assert_eq!(style.stroke_width, Some(1.5));
    }

    #[test]
    fn test_room_without_polygon_falls_back_to_rect() {
        let mut r = room("kitchen", 10, 30, None);
        r.region.polygon.clear();
        let doc = render(&[r], &[], (800, 600));
        let layer = doc.find_layer("room_kitchen").unwrap();
        assert!(matches!(layer.elements[0].shape, Shape::Rect { .. }));
        // No square footage, no second label
        assert_eq!(layer.labels().count(), 1);
    }

    #[test]
    fn test_doors_named_with_ordinals() {
        let doors = vec![
            door(DoorKind::MainDoor, 0),
            door(DoorKind::Door, 50),
            door(DoorKind::Door, 100),
        ];
        let doc = render(&[], &doors, (800, 600));

        let main = doc.find_layer("main_door").unwrap();
        assert_eq!(main.labels().collect::<Vec<_>>(), vec!["Main Door"]);
        assert_eq!(main.elements[0].style.stroke_width, Some(3.0));
        assert_eq!(main.elements[0].style.fill_opacity, Some(0.9));

        assert!(doc.find_layer("door").is_some());
        let second = doc.find_layer("door_2").unwrap();
        assert_eq!(second.elements[0].style.stroke_width, Some(2.0));
    }

    #[test]
    fn test_scale_invariance_across_canvas_sizes() {
        let rooms = vec![room("bathroom", 10, 20, None), room("kitchen", 60, 30, None)];
        let small = render(&rooms, &[], (800, 600));
        let large = render(&rooms, &[], (1600, 1200));

        assert_eq!(small.layers.len(), large.layers.len());
        for (a, b) in small.layers.iter().zip(&large.layers) {
            assert_eq!(a.id, b.id);
            for (ea, eb) in a.elements.iter().zip(&b.elements) {
                match (&ea.shape, &eb.shape) {
                    (Shape::Polygon(pa), Shape::Polygon(pb)) => {
                        for (p, q) in pa.iter().zip(pb) {
                            assert_relative_eq!(q.x, 2.0 * p.x);
                            assert_relative_eq!(q.y, 2.0 * p.y);
                        }
                    }
                    (Shape::Rect { x, y, width, height }, Shape::Rect { x: x2, y: y2, width: w2, height: h2 }) => {
                        assert_relative_eq!(*x2, 2.0 * x);
                        assert_relative_eq!(*y2, 2.0 * y);
                        assert_relative_eq!(*w2, 2.0 * width);
                        assert_relative_eq!(*h2, 2.0 * height);
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn test_empty_scene_still_renders() {
        let boundary = BoundaryContour::default();
        let scene = Scene {
            image_size: (50, 50),
            boundary: &boundary,
            rooms: &[],
            interior_walls: &[],
            doors: &[],
            plan_id: None,
        };
        let doc = VectorRenderer::new(RenderConfig::default()).render(&scene);
        assert_eq!(doc.layers.len(), 2);
        assert_eq!(doc.room_layers().count(), 0);
        let title = doc.find_layer("title").unwrap();
        assert_eq!(title.labels().next(), Some("Floor Plan - ID: unknown"));
    }
}
