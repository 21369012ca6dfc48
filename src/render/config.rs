//! Renderer configuration and layout presets

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::error::ColorError;

/// A font face and its size in pixels per em
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub path: PathBuf,
    pub size: f32,
}

impl FontSpec {
    pub fn new(path: impl Into<PathBuf>, size: f32) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

/// RGBA fill color, written as `#RRGGBB` in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TextColor(pub [u8; 4]);

impl TextColor {
    pub const WHITE: TextColor = TextColor([255, 255, 255, 255]);

    pub fn rgb(self) -> [u8; 3] {
        let [r, g, b, _] = self.0;
        [r, g, b]
    }

    pub fn rgba(self) -> [u8; 4] {
        self.0
    }
}

impl Default for TextColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for TextColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() {
            return Err(err());
        }

        let channel = |i: usize, width: usize| -> Result<u8, ColorError> {
            let digits = &hex[i * width..(i + 1) * width];
            let value = u8::from_str_radix(digits, 16).map_err(|_| err())?;
            // #RGB: each digit is doubled
            Ok(if width == 1 { value * 17 } else { value })
        };

        match hex.len() {
            3 => Ok(TextColor([channel(0, 1)?, channel(1, 1)?, channel(2, 1)?, 255])),
            6 => Ok(TextColor([channel(0, 2)?, channel(1, 2)?, channel(2, 2)?, 255])),
            8 => Ok(TextColor([
                channel(0, 2)?,
                channel(1, 2)?,
                channel(2, 2)?,
                channel(3, 2)?,
            ])),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for TextColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TextColor> for String {
    fn from(color: TextColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        if a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
        }
    }
}

/// Font sizes and geometry of a card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub small_size: f32,
    pub big_size: f32,
    pub subtitle_position: (i32, i32),
    pub title_position: (i32, i32),
    pub line_height: i32,
    pub wrap_width: usize,
}

impl Layout {
    pub const COMPACT: Layout = Layout {
        small_size: 25.0,
        big_size: 55.0,
        subtitle_position: (30, 15),
        title_position: (30, 60),
        line_height: 70,
        wrap_width: 36,
    };

    pub const LARGE: Layout = Layout {
        small_size: 50.0,
        big_size: 110.0,
        subtitle_position: (60, 30),
        title_position: (60, 120),
        line_height: 140,
        wrap_width: 36,
    };
}

/// Named layout presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Compact,
    Large,
}

impl Preset {
    pub fn layout(self) -> Layout {
        match self {
            Preset::Compact => Layout::COMPACT,
            Preset::Large => Layout::LARGE,
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(Preset::Compact),
            "large" => Ok(Preset::Large),
            other => Err(format!(
                "Unknown preset: {}. Available: compact, large",
                other
            )),
        }
    }
}

/// Everything a renderer needs, fixed at construction
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub background: PathBuf,
    pub small_font: FontSpec,
    pub big_font: FontSpec,
    pub subtitle_position: (i32, i32),
    pub title_position: (i32, i32),
    pub line_height: i32,
    pub wrap_width: usize,
    pub text_color: TextColor,
}

impl RenderConfig {
    /// Build a config from a layout, using one font face for both text runs
    pub fn from_layout(
        layout: Layout,
        background: impl Into<PathBuf>,
        font: impl Into<PathBuf>,
    ) -> Self {
        let font = font.into();
        Self {
            background: background.into(),
            small_font: FontSpec::new(font.clone(), layout.small_size),
            big_font: FontSpec::new(font, layout.big_size),
            subtitle_position: layout.subtitle_position,
            title_position: layout.title_position,
            line_height: layout.line_height,
            wrap_width: layout.wrap_width,
            text_color: TextColor::WHITE,
        }
    }

    pub fn from_preset(
        preset: Preset,
        background: impl Into<PathBuf>,
        font: impl Into<PathBuf>,
    ) -> Self {
        Self::from_layout(preset.layout(), background, font)
    }

    pub fn with_text_color(mut self, color: TextColor) -> Self {
        self.text_color = color;
        self
    }
}
