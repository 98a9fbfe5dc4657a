use anyhow::{bail, Context, Result};
use floorplan_dataset::{check_files, run_batch, BatchOptions, BatchReport, FloorplanManifest};
use floorplan_vectorizer::{ColorPalette, FloorPlanVectorizer, VectorizerConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("🚀 Starting Floor Plan Vectorization");
    println!("==========================================\n");

    let Some(manifest_path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: floorplan-vectorize <manifest.csv>");
        eprintln!("\nEnvironment:");
        eprintln!("  PALETTE_PATH  palette JSON (default: palette.json)");
        eprintln!("  CONFIG_PATH   vectorizer config JSON (optional)");
        eprintln!("  OUTPUT_DIR    where SVGs and report.json go (default: output)");
        eprintln!("  SAMPLE_SIZE   convert only the first N entries");
        eprintln!("  PARALLEL      set to 1 to convert on all cores");
        bail!("missing manifest path");
    };

    // Palette and config
    let palette_path = env_path("PALETTE_PATH", "palette.json");
    println!("🎨 Loading palette from {}...", palette_path.display());
    let palette = ColorPalette::from_file(&palette_path)
        .with_context(|| format!("failed to load palette {}", palette_path.display()))?;
    println!("✅ {} room types in palette\n", palette.entries().len());

    let config = match std::env::var("CONFIG_PATH") {
        Ok(path) => VectorizerConfig::from_file(Path::new(&path))
            .with_context(|| format!("failed to load config {}", path))?,
        Err(_) => VectorizerConfig::default(),
    }
    .apply_env();

    // Manifest
    println!("📁 Loading manifest {}...", manifest_path.display());
    let mut manifest = FloorplanManifest::from_path(&manifest_path)
        .with_context(|| format!("failed to read manifest {}", manifest_path.display()))?;
    println!("✅ Loaded {} floor plans\n", manifest.len());

    if let Some(sample_size) = std::env::var("SAMPLE_SIZE").ok().and_then(|s| s.parse().ok()) {
        manifest.truncate(sample_size);
    }

    let problems = check_files(manifest.entries());
    if !problems.is_empty() {
        println!("⚠️  {} file problems found:", problems.len());
        for problem in &problems {
            println!("   {}", problem);
        }
        println!();
    }

    let parallel = std::env::var("PARALLEL").map(|v| v == "1" || v == "true").unwrap_or(false);
    let output_dir = env_path("OUTPUT_DIR", "output");
    let options = BatchOptions::new(&output_dir).parallel(parallel);

    println!("🔍 Processing {} floor plans...\n", manifest.len());
    let vectorizer = FloorPlanVectorizer::new(palette, config);
    let report = run_batch(&vectorizer, manifest.entries(), &options)
        .context("batch conversion failed")?;

    print_report(&report);

    let report_path = output_dir.join("report.json");
    report
        .write_json(&report_path)
        .with_context(|| format!("failed to write {}", report_path.display()))?;
    println!("💾 Report saved to {}", report_path.display());

    Ok(())
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(default))
}

fn percent(n: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    n as f64 / total as f64 * 100.0
}

fn print_report(report: &BatchReport) {
    println!("==========================================");
    println!("📊 Vectorization Report");
    println!("==========================================\n");

    println!("Total Processed: {}", report.total);
    println!("Successful: {} ({:.1}%)", report.successful, percent(report.successful, report.total));
    println!("Failed: {} ({:.1}%)", report.failed, percent(report.failed, report.total));

    println!("\n📋 Detailed Results:");
    println!("{:<15} {:<10} {:<8} {:<8} {}", "ID", "Status", "Rooms", "Doors", "Notes");
    println!("{}", "-".repeat(70));

    for result in &report.results {
        let status = if result.success { "✅ OK" } else { "❌ FAIL" };
        let notes = match &result.error {
            Some(error) => error.clone(),
            None => result.warnings.join("; "),
        };
        println!(
            "{:<15} {:<10} {:<8} {:<8} {}",
            result.id, status, result.rooms, result.doors, notes
        );
    }

    println!("\n==========================================");
}
