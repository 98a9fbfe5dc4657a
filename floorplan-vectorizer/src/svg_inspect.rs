//! Read-back of rendered floor plan SVGs

use serde::Serialize;
use svg::node::element::tag::Type;
use svg::parser::Event;

use crate::error::{Result, VectorizeError};
use crate::types::Point;

/// Top-level facts about a rendered document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SvgSummary {
    pub width: Option<String>,
    pub height: Option<String>,
    pub view_box: Option<String>,
    /// Elements below the root, groups included
    pub element_count: usize,
    /// `room_*` ids in document order
    pub room_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomShape {
    Polygon { points: Vec<Point> },
    Rect { x: f64, y: f64, width: f64, height: f64 },
}

/// What an editor needs to address one room primitive
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomInfo {
    pub id: String,
    pub shape: Option<RoomShape>,
    pub fill: Option<String>,
    pub labels: Vec<String>,
}

fn parse_events(svg: &str) -> Result<svg::parser::Parser<'_>> {
    svg::read(svg).map_err(|e| VectorizeError::Svg(e.to_string()))
}

fn attr(attributes: &svg::node::Attributes, name: &str) -> Option<String> {
    attributes.get(name).map(|value| value.to_string())
}

/// Root must be `<svg>` with at least one child element
pub fn inspect(svg: &str) -> Result<SvgSummary> {
    let mut summary: Option<SvgSummary> = None;

    for event in parse_events(svg)? {
        match event {
            Event::Error(error) => return Err(VectorizeError::Svg(error.to_string())),
            Event::Tag(name, kind, attributes) => {
                if kind == Type::End {
                    continue;
                }
                let Some(summary) = summary.as_mut() else {
                    if name != "svg" {
                        return Err(VectorizeError::Svg(format!("root element is <{}>", name)));
                    }
                    summary = Some(SvgSummary {
                        width: attr(&attributes, "width"),
                        height: attr(&attributes, "height"),
                        view_box: attr(&attributes, "viewBox"),
                        element_count: 0,
                        room_ids: Vec::new(),
                    });
                    continue;
                };

                summary.element_count += 1;
                if let Some(id) = attr(&attributes, "id").filter(|id| id.starts_with("room_")) {
                    summary.room_ids.push(id);
                }
            }
            _ => {}
        }
    }

    match summary {
        None => Err(VectorizeError::Svg("no <svg> element".to_string())),
        Some(summary) if summary.element_count == 0 => {
            Err(VectorizeError::Svg("empty document".to_string()))
        }
        Some(summary) => Ok(summary),
    }
}

pub fn validate(svg: &str) -> Result<()> {
    inspect(svg).map(|_| ())
}

pub fn list_room_ids(svg: &str) -> Result<Vec<String>> {
    inspect(svg).map(|summary| summary.room_ids)
}

/// Shape, fill and labels of the element tree carrying `room_id`; `None` if absent
pub fn room_info(svg: &str, room_id: &str) -> Result<Option<RoomInfo>> {
    let mut info: Option<RoomInfo> = None;
    // Open tags inside the room's group; 0 once the group has closed
    let mut depth = 0usize;
    let mut in_text = false;

    for event in parse_events(svg)? {
        match event {
            Event::Error(error) => return Err(VectorizeError::Svg(error.to_string())),
            Event::Tag(name, kind, attributes) => {
                let Some(room) = info.as_mut() else {
                    if attr(&attributes, "id").as_deref() == Some(room_id) && kind != Type::End {
                        let mut room = RoomInfo {
                            id: room_id.to_string(),
                            shape: None,
                            fill: None,
                            labels: Vec::new(),
                        };
                        // The id may sit on the shape itself rather than on a group
                        read_shape(&mut room, name, &attributes);
                        if kind == Type::Empty {
                            return Ok(Some(room));
                        }
                        info = Some(room);
                        depth = 1;
                        in_text = name == "text";
                    }
                    continue;
                };

                match kind {
                    Type::Start => {
                        depth += 1;
                        in_text = name == "text";
                        read_shape(room, name, &attributes);
                    }
                    Type::Empty => read_shape(room, name, &attributes),
                    Type::End => {
                        depth -= 1;
                        in_text = false;
                        if depth == 0 {
                            break;
                        }
                    }
                }
            }
            Event::Text(text) if in_text => {
                if let Some(room) = info.as_mut() {
                    room.labels.push(unescape_xml(text.trim()));
                }
            }
            _ => {}
        }
    }

    Ok(info)
}

fn read_shape(room: &mut RoomInfo, name: &str, attributes: &svg::node::Attributes) {
    if room.shape.is_some() {
        return;
    }
    let shape = match name {
        "polygon" => attr(attributes, "points").map(|points| RoomShape::Polygon {
            points: parse_points(&points),
        }),
        "rect" => {
            let num = |key: &str| attr(attributes, key).and_then(|v| v.parse::<f64>().ok());
            Some(RoomShape::Rect {
                x: num("x").unwrap_or(0.0),
                y: num("y").unwrap_or(0.0),
                width: num("width").unwrap_or(0.0),
                height: num("height").unwrap_or(0.0),
            })
        }
        _ => None,
    };
    if shape.is_some() {
        room.shape = shape;
        room.fill = attr(attributes, "fill");
    }
}

fn parse_points(points: &str) -> Vec<Point> {
    points
        .split_whitespace()
        .filter_map(|pair| {
            let (x, y) = pair.split_once(',')?;
            Some(Point::new(x.parse().ok()?, y.parse().ok()?))
        })
        .collect()
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
