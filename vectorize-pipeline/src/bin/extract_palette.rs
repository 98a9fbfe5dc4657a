use anyhow::{bail, Context, Result};
use floorplan_dataset::FloorplanManifest;
use floorplan_vectorizer::palette_extractor::{PaletteExtractor, TOP_COLORS_PER_ROOM};
use floorplan_vectorizer::FloorPlanRaster;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const DEFAULT_SAMPLE_SIZE: usize = 20;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("🎨 Extracting room colours from floor plan images\n");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("Usage: extract-palette <manifest.csv | image...>");
        eprintln!("\nEnvironment:");
        eprintln!("  SAMPLE_SIZE   images to sample (default: {})", DEFAULT_SAMPLE_SIZE);
        eprintln!("  OUTPUT_PATH   palette JSON to write (default: palette.json)");
        bail!("no input images");
    }

    let sample_size = std::env::var("SAMPLE_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SAMPLE_SIZE);

    let images = input_images(&args)?;
    let sample: Vec<PathBuf> = images.into_iter().take(sample_size).collect();
    println!("📊 Analyzing {} images...", sample.len());

    let mut extractor = PaletteExtractor::new();
    for path in &sample {
        match FloorPlanRaster::from_path(path) {
            Ok(raster) => extractor.add_image(&raster),
            Err(e) => warn!("⚠️  Skipping {}: {}", path.display(), e),
        }
    }

    let palette = extractor
        .finish(TOP_COLORS_PER_ROOM)
        .context("failed to build palette")?;

    println!("\n{}", "=".repeat(60));
    println!("📊 EXTRACTED COLORS ({} images)", extractor.images_sampled());
    println!("{}", "=".repeat(60));

    for entry in palette.entries() {
        println!("\n{}:", entry.room_type.as_str().to_uppercase());
        for color in &entry.colors {
            println!(
                "  {} (RGB: [{}, {}, {}]) - found {} times",
                color.color.to_hex(),
                color.color.r,
                color.color.g,
                color.color.b,
                color.count.unwrap_or(0)
            );
        }
    }
    if palette.is_empty() {
        println!("\n  No room colours found");
    }
    println!("\n{}", "=".repeat(60));

    let output_path = std::env::var("OUTPUT_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("palette.json"));
    let json = serde_json::to_string_pretty(&palette.to_json())?;
    fs::write(&output_path, json)
        .with_context(|| format!("failed to write {}", output_path.display()))?;
    println!("\n💾 Palette saved to {}", output_path.display());

    Ok(())
}

/// A single `.csv` argument is read as a manifest; anything else is a list of images
fn input_images(args: &[String]) -> Result<Vec<PathBuf>> {
    if let [single] = args {
        if single.ends_with(".csv") {
            let manifest = FloorplanManifest::from_path(Path::new(single))
                .with_context(|| format!("failed to read manifest {}", single))?;
            return Ok(manifest
                .entries()
                .iter()
                .map(|e| e.image_path.clone())
                .collect());
        }
    }
    Ok(args.iter().map(PathBuf::from).collect())
}
