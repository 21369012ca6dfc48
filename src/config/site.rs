//! Site configuration (titlecard.yml)

use anyhow::{bail, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::render::{FontSpec, Preset, RenderConfig, TextColor};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,

    // Directory
    pub content_dir: String,
    pub posts_dir: String,
    pub output_dir: String,
    pub static_dir: String,
    pub images_dir: String,

    // Writing
    pub date_format: String,
    pub render_drafts: bool,

    // Pipeline
    /// Extra stages run before the title cards
    pub stages: Vec<String>,
    #[serde(default)]
    pub card: CardSettings,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Loopwerk".to_string(),

            content_dir: "content".to_string(),
            posts_dir: "articles".to_string(),
            output_dir: "deploy".to_string(),
            static_dir: "static".to_string(),
            images_dir: "images".to_string(),

            date_format: "%B %d, %Y".to_string(),
            render_drafts: false,

            stages: Vec::new(),
            card: CardSettings::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail later, mid-build
    pub fn validate(&self) -> Result<()> {
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            bail!("Invalid date_format: {:?}", self.date_format);
        }
        if self.card.wrap_width == Some(0) {
            bail!("card.wrap_width must be at least 1");
        }
        Ok(())
    }
}

/// Title card settings: a preset plus optional per-field overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSettings {
    pub preset: Preset,
    pub background: String,
    pub font: String,
    /// Font for the date line, defaults to `font`
    pub small_font: Option<String>,
    pub small_size: Option<f32>,
    pub big_size: Option<f32>,
    pub subtitle_position: Option<(i32, i32)>,
    pub title_position: Option<(i32, i32)>,
    pub line_height: Option<i32>,
    pub wrap_width: Option<usize>,
    pub text_color: TextColor,
    pub optimize: bool,
}

impl Default for CardSettings {
    fn default() -> Self {
        Self {
            preset: Preset::Compact,
            background: "ImageGenerator/background.png".to_string(),
            font: "ImageGenerator/Roboto-Regular.ttf".to_string(),
            small_font: None,
            small_size: None,
            big_size: None,
            subtitle_position: None,
            title_position: None,
            line_height: None,
            wrap_width: None,
            text_color: TextColor::WHITE,
            optimize: true,
        }
    }
}

impl CardSettings {
    /// Apply overrides to the preset, resolving relative paths against `base_dir`
    pub fn resolve(&self, base_dir: &Path) -> RenderConfig {
        let layout = self.preset.layout();
        let font = resolve_path(base_dir, &self.font);
        let small_font = self
            .small_font
            .as_deref()
            .map(|p| resolve_path(base_dir, p))
            .unwrap_or_else(|| font.clone());

        RenderConfig {
            background: resolve_path(base_dir, &self.background),
            small_font: FontSpec::new(small_font, self.small_size.unwrap_or(layout.small_size)),
            big_font: FontSpec::new(font, self.big_size.unwrap_or(layout.big_size)),
            subtitle_position: self.subtitle_position.unwrap_or(layout.subtitle_position),
            title_position: self.title_position.unwrap_or(layout.title_position),
            line_height: self.line_height.unwrap_or(layout.line_height),
            wrap_width: self.wrap_width.unwrap_or(layout.wrap_width),
            text_color: self.text_color,
        }
    }

    /// Every file the rendered cards depend on
    pub fn asset_paths(&self, base_dir: &Path) -> Vec<PathBuf> {
        let mut paths = vec![
            resolve_path(base_dir, &self.background),
            resolve_path(base_dir, &self.font),
        ];
        if let Some(small_font) = &self.small_font {
            paths.push(resolve_path(base_dir, small_font));
        }
        paths
    }
}

fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
