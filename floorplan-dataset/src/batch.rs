//! Converts every manifest entry and collects a per-item report.
//!
//! One item failing never aborts the batch; its error is recorded and the
//! remaining items still run.

use chrono::Utc;
use floorplan_vectorizer::FloorPlanVectorizer;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::manifest::{is_valid_id, load_record, LoaderError, ManifestEntry};
use crate::validate::{validate_output, validate_record};

#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub id: String,
    pub success: bool,
    pub rooms: usize,
    pub doors: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svg_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub warnings: Vec<String>,
}

impl ItemOutcome {
    fn failed(id: &str, error: String) -> Self {
        Self {
            id: id.to_string(),
            success: false,
            rooms: 0,
            doors: 0,
            svg_path: None,
            error: Some(error),
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub failed_ids: Vec<String>,
    /// RFC 3339 timestamp of when the batch finished
    pub generated_at: String,
    pub results: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn from_outcomes(results: Vec<ItemOutcome>) -> Self {
        let failed_ids: Vec<String> = results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.id.clone())
            .collect();

        Self {
            total: results.len(),
            successful: results.len() - failed_ids.len(),
            failed: failed_ids.len(),
            failed_ids,
            generated_at: Utc::now().to_rfc3339(),
            results,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.successful as f64 / self.total as f64 * 100.0
    }

    pub fn write_json(&self, path: &Path) -> Result<(), LoaderError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| LoaderError::Io {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        fs::write(path, json).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    pub parallel: bool,
}

impl BatchOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            parallel: false,
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Convert one entry and write `<output_dir>/<id>.svg`
pub fn process_entry(
    vectorizer: &FloorPlanVectorizer,
    entry: &ManifestEntry,
    output_dir: &Path,
) -> ItemOutcome {
    if !is_valid_id(&entry.id) {
        return ItemOutcome::failed(&entry.id, LoaderError::InvalidId(entry.id.clone()).to_string());
    }

    let record = match load_record(&entry.annotation_path) {
        Ok(record) => record,
        Err(e) => return ItemOutcome::failed(&entry.id, e.to_string()),
    };

    let conversion = match vectorizer.vectorize_path(&entry.image_path, &record) {
        Ok(conversion) => conversion,
        Err(e) => return ItemOutcome::failed(&entry.id, e.to_string()),
    };

    let svg = conversion.to_svg();
    let svg_path = output_dir.join(format!("{}.svg", entry.id));
    if let Err(e) = fs::write(&svg_path, &svg) {
        return ItemOutcome::failed(
            &entry.id,
            format!("failed to write {}: {}", svg_path.display(), e),
        );
    }

    let mut warnings = validate_record(&record);
    warnings.extend(validate_output(&record, &svg));
    for warning in &warnings {
        warn!("{}: {}", entry.id, warning);
    }

    ItemOutcome {
        id: entry.id.clone(),
        success: true,
        rooms: conversion.rooms.len(),
        doors: conversion.doors.len(),
        svg_path: Some(svg_path),
        error: None,
        warnings,
    }
}

/// Convert all entries; results keep manifest order even when run in parallel
pub fn run_batch(
    vectorizer: &FloorPlanVectorizer,
    entries: &[ManifestEntry],
    options: &BatchOptions,
) -> Result<BatchReport, LoaderError> {
    fs::create_dir_all(&options.output_dir).map_err(|source| LoaderError::Io {
        path: options.output_dir.clone(),
        source,
    })?;

    info!(
        "Converting {} floor plans into {} ({})",
        entries.len(),
        options.output_dir.display(),
        if options.parallel { "parallel" } else { "sequential" }
    );

    let results: Vec<ItemOutcome> = if options.parallel {
        entries
            .par_iter()
            .map(|entry| process_entry(vectorizer, entry, &options.output_dir))
            .collect()
    } else {
        entries
            .iter()
            .map(|entry| process_entry(vectorizer, entry, &options.output_dir))
            .collect()
    };

    let report = BatchReport::from_outcomes(results);
    info!(
        "Batch finished: {}/{} converted",
        report.successful, report.total
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::FloorplanManifest;
    use floorplan_vectorizer::{ColorPalette, VectorizerConfig};
    use image::{Rgb, RgbImage};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("floorplan-batch-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn vectorizer() -> FloorPlanVectorizer {
        let palette = ColorPalette::from_json(r##"{"kitchen": ["#ffa500"]}"##).unwrap();
        FloorPlanVectorizer::new(palette, VectorizerConfig::default())
    }

    fn write_plan(dir: &Path, id: &str) -> ManifestEntry {
        let mut img = RgbImage::from_pixel(120, 120, Rgb([255, 255, 255]));
        for y in 30..80 {
            for x in 30..80 {
                img.put_pixel(x, y, Rgb([255, 165, 0]));
            }
        }
        let image_path = dir.join(format!("{}.png", id));
        img.save(&image_path).unwrap();

        let annotation_path = dir.join(format!("{}.json", id));
        fs::write(
            &annotation_path,
            r#"{"rooms": [{"room": "kitchen", "dimensions": {"square_footage": 90}}], "total_rooms": 1}"#,
        )
        .unwrap();

        ManifestEntry {
            id: id.to_string(),
            image_path,
            annotation_path,
        }
    }

    #[test]
    fn test_batch_writes_svgs_and_records_failures() {
        let dir = temp_dir("mixed");
        let out = dir.join("out");
        let entries = vec![
            write_plan(&dir, "a"),
            ManifestEntry {
                id: "missing".to_string(),
                image_path: dir.join("missing.png"),
                annotation_path: dir.join("missing.json"),
            },
            write_plan(&dir, "b"),
        ];

        let report = run_batch(&vectorizer(), &entries, &BatchOptions::new(&out)).unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.successful, 2);
        assert_eq!(report.failed_ids, vec!["missing"]);
        assert_eq!(report.results[0].rooms, 1);
        assert!(out.join("a.svg").exists());
        assert!(out.join("b.svg").exists());

        let svg = fs::read_to_string(out.join("a.svg")).unwrap();
        assert!(svg.contains("90 sq ft"));
    }

    #[test]
    fn test_parallel_keeps_manifest_order() {
        let dir = temp_dir("parallel");
        let entries: Vec<ManifestEntry> = (0..6).map(|i| write_plan(&dir, &i.to_string())).collect();

        let options = BatchOptions::new(dir.join("out")).parallel(true);
        let report = run_batch(&vectorizer(), &entries, &options).unwrap();

        let ids: Vec<&str> = report.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4", "5"]);
        assert_eq!(report.successful, 6);
        assert!((report.success_rate() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unsafe_id_never_leaves_output_dir() {
        let dir = temp_dir("escape");
        let out = dir.join("out");
        let mut escaping = write_plan(&dir, "inner");
        escaping.id = "../escaped".to_string();
        let manifest = FloorplanManifest::from_entries(vec![escaping, write_plan(&dir, "ok")]);

        let report = run_batch(&vectorizer(), manifest.entries(), &BatchOptions::new(&out)).unwrap();

        assert_eq!(report.failed_ids, vec!["../escaped"]);
        assert!(report.results[0].error.as_deref().unwrap().contains("output file name"));
        assert!(!dir.join("escaped.svg").exists());
        assert!(out.join("ok.svg").exists());
    }

    #[test]
    fn test_report_json() {
        let dir = temp_dir("report");
        let report = BatchReport::from_outcomes(vec![ItemOutcome::failed("x", "boom".to_string())]);
        let path = dir.join("report.json");
        report.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["failed"], 1);
        assert_eq!(value["results"][0]["error"], "boom");
        assert!(value["generated_at"].is_string());
    }
}
