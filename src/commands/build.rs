//! Build title cards for every post

use anyhow::Result;

use crate::content::loader::ContentLoader;
use crate::pipeline::{BuildReport, Pipeline, PipelineOptions, StageRegistry};
use crate::Site;

/// Load posts and run the pipeline described by `options`
pub fn run(site: &Site, options: PipelineOptions) -> Result<BuildReport> {
    run_with_registry(site, &StageRegistry::default(), options)
}

/// Like [`run`], resolving stage names against a custom registry
pub fn run_with_registry(
    site: &Site,
    registry: &StageRegistry,
    options: PipelineOptions,
) -> Result<BuildReport> {
    let start = std::time::Instant::now();

    let posts = ContentLoader::new(site).load_posts()?;
    tracing::info!("Loaded {} posts", posts.len());

    let pipeline = Pipeline::new(site, registry, &options)?;
    let report = pipeline.run(site, &posts)?;

    let duration = start.elapsed();
    tracing::info!("Completed in {:.2}s", duration.as_secs_f64());

    Ok(report)
}
