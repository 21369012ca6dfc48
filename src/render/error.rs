//! Renderer errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to build a renderer from its configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load background image {path:?}: {source}")]
    Background {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to read font {path:?}: {source}")]
    FontIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid font {path:?}: {source}")]
    FontInvalid {
        path: PathBuf,
        #[source]
        source: ab_glyph::InvalidFont,
    },

    #[error("Font {path:?} cannot be used at size {size}")]
    FontSize { path: PathBuf, size: f32 },
}

/// Failure of a single render call
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid output path: {0:?}")]
    InvalidPath(PathBuf),

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode PNG for {path:?}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Invalid text color literal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color {0:?}, expected #RGB, #RRGGBB or #RRGGBBAA")]
pub struct ColorError(pub String);
