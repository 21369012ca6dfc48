//! titlecard: social-media title cards for a static blog
//!
//! This crate reads the posts of a blog, and for each one stamps its date
//! and word-wrapped title onto a background image, writing a PNG preview.

pub mod commands;
pub mod config;
pub mod content;
pub mod pipeline;
pub mod render;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Name of the site configuration file
pub const CONFIG_FILE: &str = "titlecard.yml";

/// A blog checkout and its resolved directories
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Markdown posts directory
    pub posts_dir: PathBuf,
    /// Output directory for title cards
    pub images_dir: PathBuf,
}

impl Site {
    /// Create a new Site instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a Site from an already loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let posts_dir = base_dir.join(&config.content_dir).join(&config.posts_dir);
        let images_dir = base_dir
            .join(&config.output_dir)
            .join(&config.static_dir)
            .join(&config.images_dir);

        Self {
            config,
            base_dir,
            posts_dir,
            images_dir,
        }
    }

    /// Destination of the card for a post slug
    pub fn card_path(&self, slug: &str) -> PathBuf {
        self.images_dir.join(format!("{}.png", slug))
    }

    /// Path of the configuration file (it may not exist)
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }

    /// Build the title cards for every post
    pub fn build(&self, options: pipeline::PipelineOptions) -> Result<pipeline::BuildReport> {
        commands::build::run(self, options)
    }

    /// Remove generated title cards
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_directories() {
        let site = Site::new("/blog").unwrap();
        assert_eq!(site.posts_dir, PathBuf::from("/blog/content/articles"));
        assert_eq!(
            site.card_path("looking-for-django-cms"),
            PathBuf::from("/blog/deploy/static/images/looking-for-django-cms.png")
        );
    }

    #[test]
    fn test_loads_config_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "output_dir: public\nimages_dir: og\n",
        )
        .unwrap();

        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.card_path("a"), dir.path().join("public/static/og/a.png"));
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "date_format: \"%Q\"\n").unwrap();
        assert!(Site::new(dir.path()).is_err());
    }
}
