use std::path::PathBuf;

/// Whole-image failures. Region, door and colour misses are never errors.
#[derive(Debug, thiserror::Error)]
pub enum VectorizeError {
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid palette: {0}")]
    Palette(String),

    #[error("invalid colour spec `{0}`")]
    InvalidColor(String),

    #[error("invalid room type: {0}")]
    InvalidRoomType(String),

    #[error("malformed floor plan record: {0}")]
    Record(#[source] serde_json::Error),

    #[error("malformed config: {0}")]
    Config(#[source] serde_json::Error),

    #[error("invalid SVG: {0}")]
    Svg(String),

    #[error("empty raster ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, VectorizeError>;
