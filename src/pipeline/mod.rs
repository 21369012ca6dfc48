//! Build pipeline - an explicit list of stages resolved from a typed registry

mod title_cards;

pub use title_cards::TitleCardStage;

use anyhow::{bail, Result};
use indexmap::IndexMap;
use std::time::Instant;

use crate::content::Post;
use crate::Site;

/// Everything a stage can see while it runs
pub struct BuildContext<'a> {
    pub site: &'a Site,
    pub posts: &'a [Post],
    /// Regenerate outputs even when they look up to date
    pub force: bool,
}

/// Outcome counts of one stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageReport {
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl std::ops::AddAssign for StageReport {
    fn add_assign(&mut self, other: Self) {
        self.generated += other.generated;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Outcome of a whole pipeline run, in stage order
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub stages: Vec<(String, StageReport)>,
}

impl BuildReport {
    /// Total failures across all stages
    pub fn failed(&self) -> usize {
        self.stages.iter().map(|(_, r)| r.failed).sum()
    }

    pub fn generated(&self) -> usize {
        self.stages.iter().map(|(_, r)| r.generated).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// A unit of build work.
///
/// A stage reports per-item failures in its [`StageReport`] and keeps going;
/// an `Err` means the stage could not run at all.
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self, ctx: &BuildContext<'_>) -> Result<StageReport>;
}

/// Builds a stage for a site
pub type StageFactory = fn(&Site) -> Result<Box<dyn Stage>>;

/// Maps stage names to their factories
#[derive(Clone)]
pub struct StageRegistry {
    factories: IndexMap<&'static str, StageFactory>,
}

impl StageRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    pub fn register(&mut self, name: &'static str, factory: StageFactory) -> &mut Self {
        self.factories.insert(name, factory);
        self
    }

    pub fn get(&self, name: &str) -> Option<StageFactory> {
        self.factories.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }
}

impl Default for StageRegistry {
    /// The built-in stages
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(TitleCardStage::NAME, TitleCardStage::factory);
        registry
    }
}

/// Which stages a build runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Stages to run, in order
    pub stages: Vec<String>,
    /// Run the title card stage after `stages`
    pub generate_images: bool,
    /// Regenerate outputs even when they look up to date
    pub force: bool,
}

impl PipelineOptions {
    /// Resolve the final ordered, de-duplicated stage list
    pub fn stage_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in &self.stages {
            let name = name.as_str();
            if name != TitleCardStage::NAME && !names.contains(&name) {
                names.push(name);
            }
        }
        if self.generate_images {
            names.push(TitleCardStage::NAME);
        }
        names
    }
}

/// An ordered list of constructed stages
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    force: bool,
}

impl Pipeline {
    /// Construct every stage named by `options`.
    ///
    /// Fails on an unknown stage name or when a stage cannot load what it
    /// needs, before any stage has run.
    pub fn new(site: &Site, registry: &StageRegistry, options: &PipelineOptions) -> Result<Self> {
        let mut stages = Vec::new();

        for name in options.stage_names() {
            let Some(factory) = registry.get(name) else {
                let available: Vec<_> = registry.names().collect();
                bail!(
                    "Unknown stage: {}. Available: {}",
                    name,
                    available.join(", ")
                );
            };
            stages.push(factory(site)?);
        }

        Ok(Self {
            stages,
            force: options.force,
        })
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order
    pub fn run(&self, site: &Site, posts: &[Post]) -> Result<BuildReport> {
        let ctx = BuildContext {
            site,
            posts,
            force: self.force,
        };
        let mut report = BuildReport::default();

        for stage in &self.stages {
            let start = Instant::now();
            let stage_report = stage.run(&ctx)?;
            tracing::info!(
                "{}: {} generated, {} up to date, {} failed ({:.2}s)",
                stage.name(),
                stage_report.generated,
                stage_report.skipped,
                stage_report.failed,
                start.elapsed().as_secs_f64()
            );
            report.stages.push((stage.name().to_string(), stage_report));
        }

        Ok(report)
    }
}
