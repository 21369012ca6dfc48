//! Render a single title card from the command line

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::CardSettings;
use crate::render::{PngOptions, Preset, RenderRequest, TitleCardRenderer};
use crate::Site;

/// One standalone render: title, date and destination, plus asset overrides
#[derive(Debug, Clone, Default)]
pub struct RenderArgs {
    pub title: String,
    pub date: String,
    pub output: PathBuf,
    pub preset: Option<Preset>,
    pub background: Option<PathBuf>,
    pub font: Option<PathBuf>,
    pub optimize: bool,
}

/// Render one card using the site's card settings and `args` overrides.
///
/// Relative paths in `args` are taken relative to the site directory.
pub fn run(site: &Site, args: &RenderArgs) -> Result<()> {
    let mut settings = site.config.card.clone();
    if let Some(preset) = args.preset {
        settings.preset = preset;
    }

    let mut config = settings.resolve(&site.base_dir);
    if let Some(background) = &args.background {
        config.background = resolve(&site.base_dir, background);
    }
    if let Some(font) = &args.font {
        let font = resolve(&site.base_dir, font);
        config.small_font.path = font.clone();
        config.big_font.path = font;
    }

    let renderer = TitleCardRenderer::new(config).context("Failed to load title card assets")?;

    let output = resolve(&site.base_dir, &args.output);
    let request = RenderRequest::new(args.title.as_str(), args.date.as_str(), &output);
    renderer.render_with(&request, png_options(&settings, args))?;

    tracing::info!("Wrote {:?}", output);
    Ok(())
}

/// `--optimize` can only turn on what `card.optimize` leaves off
fn png_options(settings: &CardSettings, args: &RenderArgs) -> PngOptions {
    PngOptions {
        optimize: args.optimize || settings.optimize,
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
