use image::{GenericImageView, GrayImage, Luma};
use std::collections::VecDeque;

use crate::types::BoundingBox;

/// Per-label statistics gathered during flood fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    /// 1-based; 0 in the label map means "not foreground"
    pub label: u32,
    pub area: usize,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    /// First pixel reached in raster order
    pub seed: (u32, u32),
}

impl Component {
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_extents(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

/// Dense label image plus one `Component` per label, in raster order of their seeds
#[derive(Debug, Clone)]
pub struct LabelMap {
    width: u32,
    height: u32,
    labels: Vec<u32>,
    components: Vec<Component>,
}

impl LabelMap {
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn label_at(&self, x: u32, y: u32) -> u32 {
        self.labels[y as usize * self.width as usize + x as usize]
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Binary crop of one component with `pad` background pixels on every side.
    /// Returns the mask and the image coordinate of its (0, 0).
    pub fn component_mask(&self, component: &Component, pad: u32) -> (GrayImage, (i64, i64)) {
        let mask_width = component.width() + 2 * pad;
        let mask_height = component.height() + 2 * pad;
        let mut mask = GrayImage::new(mask_width, mask_height);

        for y in component.min_y..=component.max_y {
            for x in component.min_x..=component.max_x {
                if self.label_at(x, y) == component.label {
                    mask.put_pixel(x - component.min_x + pad, y - component.min_y + pad, Luma([255]));
                }
            }
        }

        let origin = (
            component.min_x as i64 - pad as i64,
            component.min_y as i64 - pad as i64,
        );
        (mask, origin)
    }
}

/// Label 8-connected components in a single raster pass.
///
/// Two pixels join when both satisfy `is_foreground` and are exactly equal,
/// so a colour image yields one component per same-colour blob and a binary
/// mask yields one per foreground blob.
pub fn label_components<I, F>(img: &I, is_foreground: F) -> LabelMap
where
    I: GenericImageView,
    I::Pixel: PartialEq,
    F: Fn(&I::Pixel) -> bool,
{
    let (width, height) = img.dimensions();
    let mut labels = vec![0u32; width as usize * height as usize];
    let mut components = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let idx = (y as usize * width as usize) + x as usize;
            if labels[idx] != 0 {
                continue;
            }
            let pixel = img.get_pixel(x, y);
            if !is_foreground(&pixel) {
                continue;
            }
            let label = components.len() as u32 + 1;
            let component = flood_fill(img, x, y, &pixel, label, &mut labels, width, height);
            components.push(component);
        }
    }

    LabelMap {
        width,
        height,
        labels,
        components,
    }
}

/// Foreground components of a 0/255 mask
pub fn label_mask(mask: &GrayImage) -> LabelMap {
    label_components(mask, |p: &Luma<u8>| p[0] > 0)
}

#[allow(clippy::too_many_arguments)]
fn flood_fill<I>(
    img: &I,
    start_x: u32,
    start_y: u32,
    target: &I::Pixel,
    label: u32,
    labels: &mut [u32],
    width: u32,
    height: u32,
) -> Component
where
    I: GenericImageView,
    I::Pixel: PartialEq,
{
    let mut queue = VecDeque::new();
    let mut area = 0;
    let mut min_x = start_x;
    let mut min_y = start_y;
    let mut max_x = start_x;
    let mut max_y = start_y;

    queue.push_back((start_x, start_y));
    let start_idx = (start_y as usize * width as usize) + start_x as usize;
    labels[start_idx] = label;

    while let Some((x, y)) = queue.pop_front() {
        area += 1;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);

        // 8-connectivity neighbors
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx >= 0 && nx < width as i64 && ny >= 0 && ny < height as i64 {
                    let px = nx as u32;
                    let py = ny as u32;
                    let nidx = (py as usize * width as usize) + px as usize;
                    if labels[nidx] == 0 && img.get_pixel(px, py) == *target {
                        labels[nidx] = label;
                        queue.push_back((px, py));
                    }
                }
            }
        }
    }

    Component {
        label,
        area,
        min_x,
        min_y,
        max_x,
        max_y,
        seed: (start_x, start_y),
    }
}
