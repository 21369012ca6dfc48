//! Title card rendering - word-wrapped titles stamped onto a background image

mod config;
mod error;
mod renderer;
pub mod wrap;

pub use config::{FontSpec, Layout, Preset, RenderConfig, TextColor};
pub use error::{ColorError, ConfigError, RenderError};
pub use renderer::{CardLayout, PngOptions, RenderRequest, TextRun, TitleCardRenderer};
