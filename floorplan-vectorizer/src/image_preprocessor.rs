use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, RgbaImage};
use std::path::Path;

use crate::error::{Result, VectorizeError};

/// Decoded floor plan raster: RGB with alpha flattened onto white, plus its grayscale
#[derive(Debug, Clone)]
pub struct FloorPlanRaster {
    pixels: RgbImage,
    gray: GrayImage,
}

impl FloorPlanRaster {
    /// Decode PNG (or any format `image` understands) from memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)?;
        Self::from_dynamic(img)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| VectorizeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_dynamic(img: DynamicImage) -> Result<Self> {
        let pixels = if img.color().has_alpha() {
            flatten_alpha(&img.to_rgba8())
        } else {
            img.to_rgb8()
        };
        Self::from_rgb(pixels)
    }

    pub fn from_rgb(pixels: RgbImage) -> Result<Self> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(VectorizeError::EmptyImage { width, height });
        }
        let gray = to_grayscale(&pixels);
        Ok(Self { pixels, gray })
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn gray(&self) -> &GrayImage {
        &self.gray
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// 255 where the pixel is wall ink (gray <= threshold)
    pub fn wall_mask(&self, threshold: u8) -> GrayImage {
        threshold_dark(&self.gray, threshold)
    }

    /// 255 where the pixel is bright door red
    pub fn door_mask(&self) -> GrayImage {
        mask_where(&self.pixels, |p| {
            let [r, g, b] = p.0;
            r > 200 && g < 50 && b < 50
        })
    }

    /// 255 where every channel is above `level`
    pub fn near_white_mask(&self, level: u8) -> GrayImage {
        mask_where(&self.pixels, |p| p.0.iter().all(|&c| c > level))
    }
}

/// Composite RGBA over a white background
pub fn flatten_alpha(img: &RgbaImage) -> RgbImage {
    let (width, height) = img.dimensions();
    let mut rgb = RgbImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        let blend = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)) as u8;
        rgb.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    rgb
}

/// ITU-R BT.601 luma, rounded
pub fn to_grayscale(img: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000;
        gray.put_pixel(x, y, Luma([luma as u8]));
    }
    gray
}

/// Inverse binary threshold: dark pixels become foreground
pub fn threshold_dark(img: &GrayImage, threshold: u8) -> GrayImage {
    let mut binary = GrayImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        let val = if pixel[0] <= threshold { 255 } else { 0 };
        binary.put_pixel(x, y, Luma([val]));
    }
    binary
}

fn mask_where<F>(img: &RgbImage, predicate: F) -> GrayImage
where
    F: Fn(&Rgb<u8>) -> bool,
{
    let mut mask = GrayImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        if predicate(pixel) {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    #[test]
    fn test_alpha_composited_on_white() {
        let mut img = ImageBuffer::from_pixel(2, 1, Rgba([0u8, 0u8, 0u8, 0u8]));
        img.put_pixel(1, 0, Rgba([100, 50, 0, 255]));
        let rgb = flatten_alpha(&img);

        // Fully transparent black turns white, opaque pixels keep their colour
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(rgb.get_pixel(1, 0).0, [100, 50, 0]);
    }

    #[test]
    fn test_half_alpha_blends_towards_white() {
        let img = ImageBuffer::from_pixel(1, 1, Rgba([0u8, 0u8, 0u8, 128u8]));
        let rgb = flatten_alpha(&img);
        // 255 * (1 - 128/255) ~ 127, truncated
        let value = rgb.get_pixel(0, 0).0[0];
        assert!((126..=127).contains(&value), "got {}", value);
    }

    #[test]
    fn test_grayscale_uses_bt601_weights() {
        let img = RgbImage::from_fn(3, 1, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        });
        let gray = to_grayscale(&img);
        assert_eq!(gray.get_pixel(0, 0)[0], 76);
        assert_eq!(gray.get_pixel(1, 0)[0], 150);
        assert_eq!(gray.get_pixel(2, 0)[0], 29);
    }

    #[test]
    fn test_wall_mask_threshold_is_inclusive() {
        let img = RgbImage::from_fn(3, 1, |x, _| match x {
            0 => Rgb([30, 30, 30]),
            1 => Rgb([31, 31, 31]),
            _ => Rgb([0, 0, 0]),
        });
        let raster = FloorPlanRaster::from_rgb(img).unwrap();
        let mask = raster.wall_mask(30);
        assert_eq!(mask.get_pixel(0, 0)[0], 255);
        assert_eq!(mask.get_pixel(1, 0)[0], 0);
        assert_eq!(mask.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_door_and_white_masks() {
        let img = RgbImage::from_fn(3, 1, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([200, 0, 0]),
            _ => Rgb([250, 250, 250]),
        });
        let raster = FloorPlanRaster::from_rgb(img).unwrap();
        let doors = raster.door_mask();
        assert_eq!(doors.get_pixel(0, 0)[0], 255);
        assert_eq!(doors.get_pixel(1, 0)[0], 0);
        let white = raster.near_white_mask(240);
        assert_eq!(white.get_pixel(2, 0)[0], 255);
        assert_eq!(white.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_decode_png_bytes() {
        let img = ImageBuffer::from_pixel(40, 30, Rgba([255u8, 255u8, 255u8, 255u8]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let raster = FloorPlanRaster::from_bytes(&bytes).unwrap();
        assert_eq!(raster.dimensions(), (40, 30));
    }

    #[test]
    fn test_garbage_bytes_are_an_image_error() {
        let err = FloorPlanRaster::from_bytes(b"not a png").unwrap_err();
        assert!(matches!(err, VectorizeError::Image(_)));
    }
}
