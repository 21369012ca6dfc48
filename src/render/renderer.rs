//! Title card renderer

use ab_glyph::{Font, FontVec, PxScale};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageBuffer, ImageEncoder, Pixel, Rgb, Rgba};
use image::{RgbImage, RgbaImage};
use imageproc::drawing::draw_text_mut;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::config::{FontSpec, RenderConfig};
use super::error::{ConfigError, RenderError};
use super::wrap::wrap;

/// One card to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Post title, possibly HTML-escaped
    pub title: String,
    /// Line drawn above the title, usually the formatted date
    pub subtitle: String,
    /// Destination PNG
    pub output: PathBuf,
}

impl RenderRequest {
    pub fn new(
        title: impl Into<String>,
        subtitle: impl Into<String>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            output: output.into(),
        }
    }
}

/// PNG encoding options, chosen per call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PngOptions {
    /// Spend more time compressing for a smaller file
    pub optimize: bool,
}

/// A single line of text and its top-left anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub x: i32,
    pub y: i32,
}

/// The logical text layer of a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLayout {
    pub subtitle: TextRun,
    pub title: Vec<TextRun>,
}

struct LoadedFont {
    font: FontVec,
    scale: PxScale,
}

impl LoadedFont {
    fn load(spec: &FontSpec) -> Result<Self, ConfigError> {
        let bytes = fs::read(&spec.path).map_err(|source| ConfigError::FontIo {
            path: spec.path.clone(),
            source,
        })?;
        let font = FontVec::try_from_vec(bytes).map_err(|source| ConfigError::FontInvalid {
            path: spec.path.clone(),
            source,
        })?;

        let size_error = || ConfigError::FontSize {
            path: spec.path.clone(),
            size: spec.size,
        };
        if !spec.size.is_finite() || spec.size <= 0.0 {
            return Err(size_error());
        }

        // Size is pixels per em; ab_glyph scales by ascent-to-descent height
        let units_per_em = font.units_per_em().ok_or_else(size_error)?;
        let height = spec.size * font.height_unscaled() / units_per_em;
        if !height.is_finite() || height <= 0.0 {
            return Err(size_error());
        }

        Ok(Self {
            font,
            scale: PxScale::from(height),
        })
    }
}

#[derive(Clone)]
enum Background {
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

impl Background {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let image = image::open(path).map_err(|source| ConfigError::Background {
            path: path.to_path_buf(),
            source,
        })?;

        if image.color().has_alpha() {
            Ok(Background::Rgba(image.to_rgba8()))
        } else {
            Ok(Background::Rgb(image.to_rgb8()))
        }
    }

    fn dimensions(&self) -> (u32, u32) {
        match self {
            Background::Rgb(image) => image.dimensions(),
            Background::Rgba(image) => image.dimensions(),
        }
    }
}

/// Stamps titles and dates onto a cached background image.
///
/// All fallible asset I/O happens in [`TitleCardRenderer::new`]. Rendering
/// takes `&self` and draws on a private copy of the background, so one
/// renderer can serve many threads at once.
///
/// Characters missing from a font are drawn with the font's `.notdef` glyph.
pub struct TitleCardRenderer {
    config: RenderConfig,
    background: Background,
    small_font: LoadedFont,
    big_font: LoadedFont,
}

impl TitleCardRenderer {
    /// Load the background and both fonts
    pub fn new(config: RenderConfig) -> Result<Self, ConfigError> {
        let background = Background::load(&config.background)?;
        let small_font = LoadedFont::load(&config.small_font)?;
        let big_font = LoadedFont::load(&config.big_font)?;

        let (width, height) = background.dimensions();
        tracing::debug!(
            "Loaded background {:?} ({}x{})",
            config.background,
            width,
            height
        );

        Ok(Self {
            config,
            background,
            small_font,
            big_font,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Width and height of every card this renderer produces
    pub fn dimensions(&self) -> (u32, u32) {
        self.background.dimensions()
    }

    /// Where each piece of text of `request` goes, after entity decoding
    pub fn layout(&self, request: &RenderRequest) -> CardLayout {
        let title = html_escape::decode_html_entities(&request.title);
        let (x, y) = self.config.title_position;
        let line_height = self.config.line_height;

        let title = wrap(&title, self.config.wrap_width)
            .into_iter()
            .zip(0..)
            .map(|(text, i): (String, i32)| TextRun {
                text,
                x,
                y: y + i * line_height,
            })
            .collect();

        let (sx, sy) = self.config.subtitle_position;
        CardLayout {
            subtitle: TextRun {
                text: request.subtitle.clone(),
                x: sx,
                y: sy,
            },
            title,
        }
    }

    /// Draw `request` onto a fresh copy of the background
    pub fn compose(&self, request: &RenderRequest) -> DynamicImage {
        let layout = self.layout(request);
        let color = self.config.text_color;

        match self.background.clone() {
            Background::Rgb(mut canvas) => {
                self.draw(&mut canvas, Rgb(color.rgb()), &layout);
                DynamicImage::ImageRgb8(canvas)
            }
            Background::Rgba(mut canvas) => {
                self.draw(&mut canvas, Rgba(color.rgba()), &layout);
                DynamicImage::ImageRgba8(canvas)
            }
        }
    }

    /// Render `request` and write it as a PNG with default compression
    pub fn render(&self, request: &RenderRequest) -> Result<(), RenderError> {
        self.render_with(request, PngOptions::default())
    }

    /// Render `request` and write it as a PNG.
    ///
    /// The file is written next to its destination under a temporary name
    /// and renamed into place, so a failed call never leaves a partial card.
    pub fn render_with(
        &self,
        request: &RenderRequest,
        options: PngOptions,
    ) -> Result<(), RenderError> {
        let card = self.compose(request);
        write_png(&card, &request.output, options)?;
        tracing::debug!("Generated card: {:?}", request.output);
        Ok(())
    }

    fn draw<P>(
        &self,
        canvas: &mut ImageBuffer<P, Vec<P::Subpixel>>,
        color: P,
        layout: &CardLayout,
    ) where
        P: Pixel<Subpixel = u8>,
    {
        let small = &self.small_font;
        draw_text_mut(
            canvas,
            color,
            layout.subtitle.x,
            layout.subtitle.y,
            small.scale,
            &small.font,
            &layout.subtitle.text,
        );

        let big = &self.big_font;
        for line in &layout.title {
            draw_text_mut(canvas, color, line.x, line.y, big.scale, &big.font, &line.text);
        }
    }
}

fn write_png(card: &DynamicImage, path: &Path, options: PngOptions) -> Result<(), RenderError> {
    if path.file_name().is_none() {
        return Err(RenderError::InvalidPath(path.to_path_buf()));
    }
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_error = |source: io::Error| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".titlecard-")
        .suffix(".png.tmp")
        .tempfile_in(dir)
        .map_err(io_error)?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        let compression = if options.optimize {
            CompressionType::Best
        } else {
            CompressionType::Default
        };
        let encoder = PngEncoder::new_with_quality(&mut writer, compression, FilterType::Adaptive);
        encoder
            .write_image(
                card.as_bytes(),
                card.width(),
                card.height(),
                ExtendedColorType::from(card.color()),
            )
            .map_err(|source| RenderError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        writer.flush().map_err(io_error)?;
    }

    // Temporary files are created owner-only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(io_error)?;
    }

    tmp.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}
