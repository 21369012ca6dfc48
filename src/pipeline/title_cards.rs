//! Title card stage - one PNG per post under the images directory

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;

use super::{BuildContext, Stage, StageReport};
use crate::content::Post;
use crate::render::{PngOptions, RenderRequest, TitleCardRenderer};
use crate::Site;

/// Renders a title card for every post
pub struct TitleCardStage {
    renderer: TitleCardRenderer,
    options: PngOptions,
    /// Newest modification time among the config file and card assets
    assets_modified: Option<SystemTime>,
}

impl TitleCardStage {
    pub const NAME: &'static str = "title-cards";

    /// Load the card assets for `site`
    pub fn new(site: &Site) -> Result<Self> {
        let settings = &site.config.card;
        let renderer = TitleCardRenderer::new(settings.resolve(&site.base_dir))
            .context("Failed to load title card assets")?;

        let mut dependencies = settings.asset_paths(&site.base_dir);
        dependencies.push(site.config_path());
        let assets_modified = dependencies
            .iter()
            .filter_map(|path| modified(path))
            .max();

        Ok(Self {
            renderer,
            options: PngOptions {
                optimize: settings.optimize,
            },
            assets_modified,
        })
    }

    pub fn factory(site: &Site) -> Result<Box<dyn Stage>> {
        Ok(Box::new(Self::new(site)?))
    }

    /// A card is current when it is newer than its post and every asset
    fn is_up_to_date(&self, post: &Post, output: &Path) -> bool {
        let (Some(card), Some(source)) = (modified(output), modified(&post.full_source)) else {
            return false;
        };
        card >= source && self.assets_modified.map_or(true, |assets| card >= assets)
    }

    fn render_all(&self, jobs: &[RenderRequest]) -> Result<StageReport> {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(jobs.len())
            .max(1);
        let next = &AtomicUsize::new(0);
        let renderer = &self.renderer;
        let options = self.options;

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(move |_| {
                    s.spawn(move || {
                        let mut report = StageReport::default();
                        loop {
                            let i = next.fetch_add(1, Ordering::Relaxed);
                            let Some(request) = jobs.get(i) else {
                                break;
                            };
                            match renderer.render_with(request, options) {
                                Ok(()) => report.generated += 1,
                                Err(e) => {
                                    tracing::error!(
                                        "Failed to render card for {:?}: {}",
                                        request.title,
                                        e
                                    );
                                    report.failed += 1;
                                }
                            }
                        }
                        report
                    })
                })
                .collect();

            let mut total = StageReport::default();
            for handle in handles {
                total += handle
                    .join()
                    .map_err(|_| anyhow!("Title card worker panicked"))?;
            }
            Ok(total)
        })
    }
}

impl Stage for TitleCardStage {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&self, ctx: &BuildContext<'_>) -> Result<StageReport> {
        let images_dir = &ctx.site.images_dir;
        fs::create_dir_all(images_dir)
            .with_context(|| format!("Failed to create {:?}", images_dir))?;

        let date_format = &ctx.site.config.date_format;
        let mut skipped = 0;
        let mut jobs = Vec::with_capacity(ctx.posts.len());

        for post in ctx.posts {
            let output = ctx.site.card_path(&post.slug);
            if !ctx.force && self.is_up_to_date(post, &output) {
                tracing::debug!("Up to date: {:?}", output);
                skipped += 1;
                continue;
            }
            jobs.push(post.card_request(date_format, output));
        }

        let mut report = self.render_all(&jobs)?;
        report.skipped = skipped;
        Ok(report)
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
