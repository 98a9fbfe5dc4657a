use csv::ReaderBuilder;
use floorplan_vectorizer::FloorPlanRecord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One image/annotation pair listed in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    pub image_path: PathBuf,
    pub annotation_path: PathBuf,
}

/// Represents a row in the manifest CSV (`id,image,annotation`)
#[derive(Debug, Deserialize)]
struct ManifestRow {
    id: String,
    image: String,
    annotation: String,
}

/// Error types for the dataset loader
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("annotation {path} is not a valid record: {source}")]
    Annotation {
        path: PathBuf,
        #[source]
        source: floorplan_vectorizer::VectorizeError,
    },

    #[error("manifest not found at: {0}")]
    ManifestNotFound(PathBuf),

    #[error("duplicate id `{0}` in manifest")]
    DuplicateId(String),

    #[error("id `{0}` cannot be used as an output file name")]
    InvalidId(String),
}

/// Ids name the output `<id>.svg`, so they must stay a single path component
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\'])
        && !id.chars().any(char::is_control)
}

/// Parse a manifest; relative paths resolve against the manifest's directory
pub fn parse_manifest(manifest_path: &Path) -> Result<Vec<ManifestEntry>, LoaderError> {
    if !manifest_path.exists() {
        return Err(LoaderError::ManifestNotFound(manifest_path.to_path_buf()));
    }
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(manifest_path)?;

    let mut entries: Vec<ManifestEntry> = Vec::new();
    for result in reader.deserialize() {
        let row: ManifestRow = result?;
        if !is_valid_id(&row.id) {
            return Err(LoaderError::InvalidId(row.id));
        }
        if entries.iter().any(|e| e.id == row.id) {
            return Err(LoaderError::DuplicateId(row.id));
        }
        entries.push(ManifestEntry {
            image_path: base.join(&row.image),
            annotation_path: base.join(&row.annotation),
            id: row.id,
        });
    }

    Ok(entries)
}

/// Read and parse one annotation JSON
pub fn load_record(path: &Path) -> Result<FloorPlanRecord, LoaderError> {
    let content = fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    FloorPlanRecord::from_json(&content).map_err(|source| LoaderError::Annotation {
        path: path.to_path_buf(),
        source,
    })
}

/// Problems found by checking that every listed file exists and every image header decodes
pub fn check_files(entries: &[ManifestEntry]) -> Vec<String> {
    let mut errors = Vec::new();

    for entry in entries {
        if !entry.annotation_path.exists() {
            errors.push(format!("{}: missing annotation {}", entry.id, entry.annotation_path.display()));
        }
        if !entry.image_path.exists() {
            errors.push(format!("{}: missing image {}", entry.id, entry.image_path.display()));
            continue;
        }
        if let Err(e) = image::image_dimensions(&entry.image_path) {
            errors.push(format!("{}: unreadable image: {}", entry.id, e));
        }
    }

    errors
}

/// Manifest entries in file order
pub struct FloorplanManifest {
    entries: Vec<ManifestEntry>,
}

impl FloorplanManifest {
    pub fn from_path(path: &Path) -> Result<Self, LoaderError> {
        Ok(Self {
            entries: parse_manifest(path)?,
        })
    }

    pub fn from_entries(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only the first `size` entries
    pub fn truncate(&mut self, size: usize) {
        self.entries.truncate(size);
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }
}
