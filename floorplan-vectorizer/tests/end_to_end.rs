use floorplan_vectorizer::svg_inspect;
use floorplan_vectorizer::{
    ColorPalette, FloorPlanRecord, FloorPlanVectorizer, LayerKind, VectorizerConfig,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

const ORANGE: Rgb<u8> = Rgb([255, 165, 0]);
const LIGHT_BLUE: Rgb<u8> = Rgb([135, 206, 235]);

const PALETTE: &str = r##"{
    "master bedroom": ["#ffa500"],
    "bathroom": [[135, 206, 235]],
    "kitchen": ["#e67878"]
}"##;

fn fill(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            img.put_pixel(x, y, color);
        }
    }
}

fn bordered_plan() -> RgbImage {
    let mut img = RgbImage::from_pixel(400, 400, Rgb([255, 255, 255]));
    let black = Rgb([0, 0, 0]);
    fill(&mut img, 0, 0, 400, 2, black);
    fill(&mut img, 0, 398, 400, 2, black);
    fill(&mut img, 0, 0, 2, 400, black);
    fill(&mut img, 398, 0, 2, 400, black);
    img
}

fn png_bytes(img: DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn vectorizer() -> FloorPlanVectorizer {
    let palette = ColorPalette::from_json(PALETTE).unwrap();
    FloorPlanVectorizer::new(palette, VectorizerConfig::default())
}

#[test]
fn two_room_plan_round_trips_through_svg() {
    let mut img = bordered_plan();
    fill(&mut img, 20, 20, 100, 100, ORANGE);
    fill(&mut img, 280, 20, 100, 100, LIGHT_BLUE);

    let record = FloorPlanRecord::from_json(
        r#"{
            "id": "e2e-1",
            "rooms": [
                {"room": "master bedroom", "dimensions": {"square_footage": 120}},
                {"room": "bathroom", "dimensions": {"square_footage": 40}}
            ],
            "total_rooms": 2,
            "total_square_footage": 160
        }"#,
    )
    .unwrap();

    let conversion = vectorizer()
        .vectorize_bytes(&png_bytes(DynamicImage::ImageRgb8(img)), &record)
        .unwrap();
    let doc = &conversion.document;

    let mut names: Vec<&str> = doc.room_layers().filter_map(|l| l.name.as_deref()).collect();
    names.sort();
    assert_eq!(names, vec!["bathroom", "master bedroom"]);
    assert_eq!(doc.layers_of(LayerKind::Boundary).count(), 1);

    let master = doc.find_layer("room_master_bedroom").unwrap();
    assert!(master.labels().any(|l| l == "120 sq ft"));
    let bathroom = doc.find_layer("room_bathroom").unwrap();
    assert!(bathroom.labels().any(|l| l == "40 sq ft"));

    assert_eq!(conversion.stats.regions, 2);
    assert_eq!(conversion.stats.unknown_rooms, 0);
    assert!(conversion.stats.has_boundary);

    let svg = conversion.to_svg();
    svg_inspect::validate(&svg).unwrap();

    let mut ids = svg_inspect::list_room_ids(&svg).unwrap();
    ids.sort();
    assert_eq!(ids, vec!["room_bathroom", "room_master_bedroom"]);

    let info = svg_inspect::room_info(&svg, "room_master_bedroom")
        .unwrap()
        .unwrap();
    assert_eq!(info.fill.as_deref(), Some("rgb(255,165,0)"));
    assert_eq!(info.labels, vec!["Master Bedroom", "120 sq ft"]);
    assert!(svg.contains("Floor Plan - ID: e2e-1"));
    assert!(svg.contains(r#"id="floor_plan_boundary""#));
}

#[test]
fn plan_without_rooms_yields_empty_document_not_error() {
    let conversion = vectorizer()
        .vectorize_bytes(
            &png_bytes(DynamicImage::ImageRgb8(bordered_plan())),
            &FloorPlanRecord::default(),
        )
        .unwrap();

    assert_eq!(conversion.document.room_layers().count(), 0);
    assert_eq!(conversion.stats.regions, 0);
    assert!(conversion.stats.has_boundary);
    assert!(svg_inspect::validate(&conversion.to_svg()).is_ok());
}

#[test]
fn transparent_background_is_treated_as_white() {
    let mut img = RgbaImage::from_pixel(200, 200, Rgba([0, 0, 0, 0]));
    for y in 50..100 {
        for x in 50..100 {
            img.put_pixel(x, y, Rgba([255, 165, 0, 255]));
        }
    }

    let conversion = vectorizer()
        .vectorize_bytes(&png_bytes(DynamicImage::ImageRgba8(img)), &FloorPlanRecord::default())
        .unwrap();

    // Fully transparent black must not read as wall ink
    assert!(!conversion.stats.has_boundary);
    assert_eq!(conversion.rooms.len(), 1);
    assert_eq!(conversion.rooms[0].name, "master bedroom");
    assert_eq!(conversion.rooms[0].dimensions, None);
}

#[test]
fn duplicate_room_types_are_numbered() {
    let mut img = bordered_plan();
    for x in [20, 150, 280] {
        fill(&mut img, x, 200, 60, 60, ORANGE);
    }

    let conversion = vectorizer()
        .vectorize_bytes(&png_bytes(DynamicImage::ImageRgb8(img)), &FloorPlanRecord::default())
        .unwrap();

    let names: Vec<&str> = conversion.rooms.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["master bedroom", "master bedroom 2", "master bedroom 3"]);
    for id in ["room_master_bedroom", "room_master_bedroom_2", "room_master_bedroom_3"] {
        assert!(conversion.document.find_layer(id).is_some(), "missing {}", id);
    }
}

#[test]
fn default_config_matches_colours_within_tolerance() {
    let mut img = bordered_plan();
    // Anti-aliased export: every channel off by three from the kitchen swatch
    fill(&mut img, 40, 40, 80, 80, Rgb([233, 117, 123]));

    let conversion = vectorizer()
        .vectorize_bytes(&png_bytes(DynamicImage::ImageRgb8(img)), &FloorPlanRecord::default())
        .unwrap();

    assert_eq!(conversion.stats.matched_rooms, 1);
    assert_eq!(conversion.stats.unknown_rooms, 0);
    assert_eq!(conversion.rooms[0].name, "kitchen");
}
