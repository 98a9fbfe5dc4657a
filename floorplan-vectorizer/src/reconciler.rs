//! Assigns names, dimensions and positions to segmented regions

use std::collections::HashMap;
use tracing::debug;

use crate::palette::ColorPalette;
use crate::record::{FloorPlanRecord, StructuredRoom};
use crate::types::{GeometricRegion, ReconciledRoom};

/// Interchangeable spellings of one room type; lookups work in either direction
const LABEL_VARIANTS: &[(&str, &[&str])] = &[
    ("master bedroom", &["master room", "master"]),
    ("common room", &["common"]),
    ("living room", &["living"]),
    ("bathroom", &["bath"]),
    ("kitchen", &["kitchen"]),
    ("balcony", &["balcony"]),
];

/// Hands out `label`, `label 2`, `label 3`, ... per label
#[derive(Debug, Default)]
pub struct OrdinalNamer {
    counts: HashMap<String, usize>,
}

impl OrdinalNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero-based occurrence index of `label` and the name for it
    pub fn next(&mut self, label: &str) -> (usize, String) {
        let count = self.counts.entry(label.to_string()).or_insert(0);
        *count += 1;
        let name = if *count > 1 {
            format!("{} {}", label, count)
        } else {
            label.to_string()
        };
        (*count - 1, name)
    }
}

/// Name every region and copy attributes from the matching record entry.
///
/// Output order follows `regions`. Colours the palette does not know become
/// `room_<n>` with no attributes.
pub fn reconcile(
    regions: &[GeometricRegion],
    record: &FloorPlanRecord,
    palette: &ColorPalette,
    tolerance: u8,
) -> Vec<ReconciledRoom> {
    let groups = record.rooms_by_type();
    let mut namer = OrdinalNamer::new();
    let mut unknown = 0;

    regions
        .iter()
        .map(|region| {
            let Some(room_type) = palette.classify(region.color, tolerance) else {
                unknown += 1;
                debug!("No palette match for {} at {:?}", region.color, region.bounding_box);
                return ReconciledRoom {
                    region: region.clone(),
                    name: format!("room_{}", unknown),
                    room_type: None,
                    dimensions: None,
                    position: None,
                };
            };

            let (index, name) = namer.next(room_type.as_str());
            let source = match_record_entry(&groups, room_type.as_str(), index);
            if source.is_none() {
                debug!("No record entry for {}", name);
            }

            ReconciledRoom {
                region: region.clone(),
                name,
                room_type: Some(room_type.to_string()),
                dimensions: source.and_then(|room| room.dimensions.clone()),
                position: source.and_then(|room| room.position.clone()),
            }
        })
        .collect()
}

/// Entry `index` of the type's group, else the group's first entry, else entry
/// `index` under another spelling from the type's own variant family
fn match_record_entry<'a>(
    groups: &HashMap<&str, Vec<&'a StructuredRoom>>,
    room_type: &str,
    index: usize,
) -> Option<&'a StructuredRoom> {
    if let Some(group) = groups.get(room_type) {
        return group.get(index).or_else(|| group.first()).copied();
    }

    let (label, variants) = variant_family(room_type)?;
    std::iter::once(label)
        .chain(variants.iter().copied())
        .filter(|candidate| *candidate != room_type)
        .find_map(|candidate| groups.get(candidate).and_then(|group| group.get(index)))
        .copied()
}

/// The row a label belongs to, whether it is the canonical name or a variant
fn variant_family(room_type: &str) -> Option<(&'static str, &'static [&'static str])> {
    LABEL_VARIANTS
        .iter()
        .copied()
        .find(|(label, variants)| *label == room_type || variants.iter().any(|v| *v == room_type))
}
