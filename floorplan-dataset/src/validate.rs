//! Sanity checks on parsed records and rendered documents.
//! Findings are warnings; they never fail a conversion.

use floorplan_vectorizer::svg_inspect;
use floorplan_vectorizer::FloorPlanRecord;

/// Largest tolerated gap between the record's room count and the rooms drawn
pub const ROOM_COUNT_TOLERANCE: usize = 2;
/// Smaller output is almost certainly truncated
pub const MIN_SVG_BYTES: usize = 100;
pub const MAX_SVG_BYTES: usize = 1_000_000;

pub fn validate_record(record: &FloorPlanRecord) -> Vec<String> {
    let mut issues = Vec::new();

    if record.rooms.is_empty() {
        issues.push("no rooms in annotation".to_string());
    }
    for (i, room) in record.rooms.iter().enumerate() {
        let square_footage = room.dimensions.as_ref().and_then(|d| d.square_footage);
        if square_footage == Some(0) {
            issues.push(format!("room {} ({}): invalid square footage", i, room.room_type));
        }
    }

    issues
}

pub fn validate_output(record: &FloorPlanRecord, svg: &str) -> Vec<String> {
    let mut issues = Vec::new();

    if svg.len() < MIN_SVG_BYTES {
        issues.push(format!("SVG too small ({} bytes)", svg.len()));
    }
    if svg.len() > MAX_SVG_BYTES {
        issues.push(format!("SVG too large ({} bytes)", svg.len()));
    }

    match svg_inspect::inspect(svg) {
        Ok(summary) => {
            let drawn = summary.room_ids.len();
            if record.total_rooms.abs_diff(drawn) > ROOM_COUNT_TOLERANCE {
                issues.push(format!(
                    "room count mismatch: annotation={}, svg={}",
                    record.total_rooms, drawn
                ));
            }
        }
        Err(e) => issues.push(e.to_string()),
    }

    issues
}
