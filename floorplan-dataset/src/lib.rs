//! Manifest loading, output validation and batch conversion for floor plan datasets.

pub mod batch;
pub mod manifest;
pub mod validate;

pub use batch::{process_entry, run_batch, BatchOptions, BatchReport, ItemOutcome};
pub use manifest::{
    check_files, is_valid_id, load_record, parse_manifest, FloorplanManifest, LoaderError,
    ManifestEntry,
};
pub use validate::{validate_output, validate_record};
