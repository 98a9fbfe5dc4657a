//! Offline palette sampling over a corpus of rendered floor plans

use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::config::{NEAR_BLACK, NEAR_WHITE};
use crate::error::Result;
use crate::image_preprocessor::FloorPlanRaster;
use crate::palette::{ColorPalette, PaletteColor};
use crate::record::RoomType;
use crate::types::Color;

/// Colours kept per room type
pub const TOP_COLORS_PER_ROOM: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorCategory {
    Background,
    Wall,
    Door,
    Balcony,
    MasterBedroom,
    Bathroom,
    CommonRoom,
    LivingRoom,
    Kitchen,
    Unknown,
}

/// Room categories in the order they are written to the palette
pub const ROOM_CATEGORIES: [ColorCategory; 6] = [
    ColorCategory::Balcony,
    ColorCategory::MasterBedroom,
    ColorCategory::Bathroom,
    ColorCategory::CommonRoom,
    ColorCategory::LivingRoom,
    ColorCategory::Kitchen,
];

impl ColorCategory {
    /// Hue heuristics for the dataset's fill colours; first rule that fires wins
    pub fn categorize(color: Color) -> Self {
        let (r, g, b) = (color.r as i32, color.g as i32, color.b as i32);

        if color.is_near_white(NEAR_WHITE) {
            return Self::Background;
        }
        if color.is_near_black(NEAR_BLACK) {
            return Self::Wall;
        }
        if color.is_bright_red() {
            return Self::Door;
        }
        // dark green
        if r < 120 && g > 100 && b < 100 {
            return Self::Balcony;
        }
        // orange
        if r > 200 && (101..200).contains(&g) && b < 100 {
            return Self::MasterBedroom;
        }
        // light blue
        if b > 150 && b > r && b > g && r < 180 && g < 180 {
            return Self::Bathroom;
        }
        // yellow
        if r > 200 && g > 200 && b < 100 {
            return Self::CommonRoom;
        }
        // cream / light green
        if (151..250).contains(&r)
            && (151..250).contains(&g)
            && (101..200).contains(&b)
            && (g - r).abs() < 60
        {
            return Self::LivingRoom;
        }
        // red / pink, bright door red already excluded
        if r > 180 && g < 150 && b < 150 {
            return Self::Kitchen;
        }
        Self::Unknown
    }

    pub fn room_type(&self) -> Option<&'static str> {
        match self {
            Self::Balcony => Some("balcony"),
            Self::MasterBedroom => Some("master bedroom"),
            Self::Bathroom => Some("bathroom"),
            Self::CommonRoom => Some("common room"),
            Self::LivingRoom => Some("living room"),
            Self::Kitchen => Some("kitchen"),
            _ => None,
        }
    }
}

/// Counts, per room category, how many sampled images contain each colour
#[derive(Debug, Default)]
pub struct PaletteExtractor {
    /// First-seen order is kept for tie-breaking
    tallies: HashMap<ColorCategory, Vec<(Color, u32)>>,
    images: usize,
}

impl PaletteExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images_sampled(&self) -> usize {
        self.images
    }

    pub fn add_image(&mut self, raster: &FloorPlanRaster) {
        let colors = unique_colors(raster);
        let mut room_colors = 0;

        for color in colors {
            let category = ColorCategory::categorize(color);
            if category.room_type().is_none() {
                continue;
            }
            room_colors += 1;
            let tally = self.tallies.entry(category).or_default();
            match tally.iter_mut().find(|(c, _)| *c == color) {
                Some((_, count)) => *count += 1,
                None => tally.push((color, 1)),
            }
        }

        self.images += 1;
        debug!("Sampled image {}: {} room-coloured values", self.images, room_colors);
    }

    /// Most frequent `top_n` colours per room category, categories in `ROOM_CATEGORIES` order
    pub fn finish(&self, top_n: usize) -> Result<ColorPalette> {
        let mut palette = ColorPalette::new();

        for category in ROOM_CATEGORIES {
            let (Some(label), Some(tally)) = (category.room_type(), self.tallies.get(&category)) else {
                continue;
            };
            let mut ranked = tally.clone();
            // Stable, so equal counts stay in first-seen order
            ranked.sort_by(|a, b| b.1.cmp(&a.1));

            let colors = ranked
                .into_iter()
                .take(top_n)
                .map(|(color, count)| PaletteColor {
                    color,
                    count: Some(count),
                })
                .collect();
            palette.push(RoomType::new(label)?, colors);
        }

        Ok(palette)
    }
}

/// Distinct pixel values, ascending by (R, G, B)
pub fn unique_colors(raster: &FloorPlanRaster) -> BTreeSet<Color> {
    raster.pixels().pixels().map(|p| Color::from(*p)).collect()
}
