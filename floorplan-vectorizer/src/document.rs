//! Layered vector document and its SVG serialisation

use std::fmt::Write;

use crate::types::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Background,
    Boundary,
    InteriorWalls,
    Room,
    Door,
    Title,
}

/// Presentation attributes; unset fields are omitted from the output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub fill: Option<String>,
    pub fill_opacity: Option<f64>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub stroke_linejoin: Option<&'static str>,
    pub stroke_linecap: Option<&'static str>,
    pub font_family: Option<&'static str>,
    pub font_size: Option<f64>,
    pub font_weight: Option<&'static str>,
    pub text_anchor: Option<&'static str>,
    pub dominant_baseline: Option<&'static str>,
}

impl Style {
    pub fn filled(fill: &str) -> Self {
        Self {
            fill: Some(fill.to_string()),
            ..Self::default()
        }
    }

    pub fn stroked(stroke: &str, width: f64) -> Self {
        Self {
            fill: Some("none".to_string()),
            stroke: Some(stroke.to_string()),
            stroke_width: Some(width),
            ..Self::default()
        }
    }

    /// Arial text centred on its anchor point
    pub fn label(size: f64, bold: bool, fill: &str) -> Self {
        Self {
            fill: Some(fill.to_string()),
            font_family: Some("Arial"),
            font_size: Some(size),
            font_weight: bold.then_some("bold"),
            text_anchor: Some("middle"),
            dominant_baseline: Some("middle"),
            ..Self::default()
        }
    }

    fn write_attrs(&self, out: &mut String) {
        let mut attr = |name: &str, value: String| {
            let _ = write!(out, r#" {}="{}""#, name, escape_xml(&value));
        };
        if let Some(v) = &self.fill {
            attr("fill", v.clone());
        }
        if let Some(v) = self.fill_opacity {
            attr("fill-opacity", fmt_num(v));
        }
        if let Some(v) = &self.stroke {
            attr("stroke", v.clone());
        }
        if let Some(v) = self.stroke_width {
            attr("stroke-width", fmt_num(v));
        }
        if let Some(v) = self.stroke_linejoin {
            attr("stroke-linejoin", v.to_string());
        }
        if let Some(v) = self.stroke_linecap {
            attr("stroke-linecap", v.to_string());
        }
        if let Some(v) = self.font_family {
            attr("font-family", v.to_string());
        }
        if let Some(v) = self.font_size {
            attr("font-size", format!("{}px", fmt_num(v)));
        }
        if let Some(v) = self.font_weight {
            attr("font-weight", v.to_string());
        }
        if let Some(v) = self.text_anchor {
            attr("text-anchor", v.to_string());
        }
        if let Some(v) = self.dominant_baseline {
            attr("dominant-baseline", v.to_string());
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Polygon(Vec<Point>),
    Polyline(Vec<Point>),
    Text {
        x: f64,
        y: f64,
        content: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: Option<String>,
    pub shape: Shape,
    pub style: Style,
}

impl Element {
    pub fn new(shape: Shape, style: Style) -> Self {
        Self {
            id: None,
            shape,
            style,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn text(&self) -> Option<&str> {
        match &self.shape {
            Shape::Text { content, .. } => Some(content.as_str()),
            _ => None,
        }
    }

    fn write_svg(&self, out: &mut String, indent: &str) {
        let tag = match self.shape {
            Shape::Rect { .. } => "rect",
            Shape::Polygon(_) => "polygon",
            Shape::Polyline(_) => "polyline",
            Shape::Text { .. } => "text",
        };
        let _ = write!(out, "{}<{}", indent, tag);
        if let Some(id) = &self.id {
            let _ = write!(out, r#" id="{}""#, escape_xml(id));
        }

        match &self.shape {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => {
                let _ = write!(
                    out,
                    r#" x="{}" y="{}" width="{}" height="{}""#,
                    fmt_num(*x),
                    fmt_num(*y),
                    fmt_num(*width),
                    fmt_num(*height)
                );
            }
            Shape::Polygon(points) | Shape::Polyline(points) => {
                let _ = write!(out, r#" points="{}""#, fmt_points(points));
            }
            Shape::Text { x, y, .. } => {
                let _ = write!(out, r#" x="{}" y="{}""#, fmt_num(*x), fmt_num(*y));
            }
        }

        self.style.write_attrs(out);

        match &self.shape {
            Shape::Text { content, .. } => {
                let _ = writeln!(out, ">{}</text>", escape_xml(content));
            }
            _ => out.push_str("/>\n"),
        }
    }
}

/// One paint-order group of elements
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    /// Written as a `<g id>` wrapper when set
    pub id: Option<String>,
    /// Display name of the room or door this layer draws
    pub name: Option<String>,
    pub elements: Vec<Element>,
}

impl Layer {
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            id: None,
            name: None,
            elements: Vec::new(),
        }
    }

    pub fn group(kind: LayerKind, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::new(kind)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    fn has_id(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id) || self.elements.iter().any(|e| e.id.as_deref() == Some(id))
    }

    /// Text content of every label in the layer
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(Element::text)
    }
}

/// Canvas-sized tree of layers, back to front
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDocument {
    pub width: u32,
    pub height: u32,
    pub view_box: (f64, f64, f64, f64),
    pub layers: Vec<Layer>,
}

impl VectorDocument {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            view_box: (0.0, 0.0, width as f64, height as f64),
            layers: Vec::new(),
        }
    }

    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Layer whose group id, or one of whose element ids, equals `id`
    pub fn find_layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.has_id(id))
    }

    pub fn find_layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.has_id(id))
    }

    pub fn layers_of(&self, kind: LayerKind) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(move |layer| layer.kind == kind)
    }

    pub fn room_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers_of(LayerKind::Room)
    }

    pub fn to_svg(&self) -> String {
        let (vx, vy, vw, vh) = self.view_box;
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}px" height="{}px" viewBox="{} {} {} {}">"#,
            self.width,
            self.height,
            fmt_num(vx),
            fmt_num(vy),
            fmt_num(vw),
            fmt_num(vh)
        );

        for layer in &self.layers {
            match &layer.id {
                Some(id) => {
                    let _ = writeln!(out, r#"  <g id="{}">"#, escape_xml(id));
                    for element in &layer.elements {
                        element.write_svg(&mut out, "    ");
                    }
                    out.push_str("  </g>\n");
                }
                None => {
                    for element in &layer.elements {
                        element.write_svg(&mut out, "  ");
                    }
                }
            }
        }

        out.push_str("</svg>\n");
        out
    }
}

/// Lowercase, with every character outside `[a-z0-9_-]` (spaces and hyphens included) turned into `_`
pub fn element_id(prefix: &str, name: &str) -> String {
    let sanitized: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}{}", prefix, sanitized)
}

/// `master_bedroom 2` -> `Master Bedroom 2`
pub fn title_case(name: &str) -> String {
    name.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.2}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn fmt_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", fmt_num(p.x), fmt_num(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_id_sanitising() {
        assert_eq!(element_id("room_", "Master Bedroom 2"), "room_master_bedroom_2");
        assert_eq!(element_id("room_", "walk-in closet"), "room_walk_in_closet");
        assert_eq!(element_id("room_", "study/office"), "room_study_office");
        assert_eq!(element_id("", "main door"), "main_door");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("master bedroom 2"), "Master Bedroom 2");
        assert_eq!(title_case("room_3"), "Room 3");
        assert_eq!(title_case("LIVING room"), "Living Room");
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(fmt_num(4.0), "4");
        assert_eq!(fmt_num(1.5), "1.5");
        assert_eq!(fmt_num(1.0 / 3.0), "0.33");
        assert_eq!(fmt_num(2.999), "3");
        assert_eq!(fmt_num(-3.0), "-3");
    }

    #[test]
    fn test_svg_serialisation() {
        let mut doc = VectorDocument::new(800, 600);
        let mut background = Layer::new(LayerKind::Background);
        background.push(Element::new(
            Shape::Rect {
                x: 0.0,
                y: 0.0,
                width: 800.0,
                height: 600.0,
            },
            Style::filled("white"),
        ));
        doc.push(background);

        let mut room = Layer::group(LayerKind::Room, "room_kitchen").with_name("kitchen");
        room.push(Element::new(
            Shape::Polygon(vec![
                Point::new(0.0, 0.0),
                Point::new(10.5, 0.0),
                Point::new(10.5, 10.0),
            ]),
            Style::stroked("black", 1.5),
        ));
        room.push(Element::new(
            Shape::Text {
                x: 5.0,
                y: 5.0,
                content: "Kitchen & <Pantry>".to_string(),
            },
            Style::label(12.0, true, "black"),
        ));
        doc.push(room);

        let svg = doc.to_svg();
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="800px" height="600px" viewBox="0 0 800 600">"#));
        assert!(svg.contains(r#"<rect x="0" y="0" width="800" height="600" fill="white"/>"#));
        assert!(svg.contains(r#"<g id="room_kitchen">"#));
        assert!(svg.contains(r#"points="0,0 10.5,0 10.5,10""#));
        assert!(svg.contains("Kitchen &amp; &lt;Pantry&gt;</text>"));
        assert!(svg.contains(r#"font-size="12px""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_find_layer_by_group_or_element_id() {
        let mut doc = VectorDocument::new(100, 100);
        let mut boundary = Layer::new(LayerKind::Boundary);
        boundary.push(
            Element::new(Shape::Polygon(vec![]), Style::stroked("black", 4.0))
                .with_id("floor_plan_boundary"),
        );
        doc.push(boundary);
        doc.push(Layer::group(LayerKind::Room, "room_bathroom").with_name("bathroom"));

        assert_eq!(
            doc.find_layer("floor_plan_boundary").map(|l| l.kind),
            Some(LayerKind::Boundary)
        );
        assert_eq!(
            doc.find_layer("room_bathroom").and_then(|l| l.name.as_deref()),
            Some("bathroom")
        );
        assert!(doc.find_layer("room_kitchen").is_none());
        assert_eq!(doc.room_layers().count(), 1);

        doc.find_layer_mut("room_bathroom").unwrap().name = Some("ensuite".to_string());
        assert_eq!(doc.room_layers().next().unwrap().name.as_deref(), Some("ensuite"));
    }
}
