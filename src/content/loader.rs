//! Content loader - loads posts from the posts directory

use anyhow::Result;
use chrono::{DateTime, Local};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::frontmatter::parse_date_string;
use super::{FrontMatter, Post};
use crate::Site;

lazy_static! {
    /// `2024-01-15-some-slug`
    static ref DATED_STEM: Regex = Regex::new(r"^(\d{4}-\d{2}-\d{2})-(.+)$").unwrap();
}

/// Loads posts from the site's posts directory
pub struct ContentLoader<'a> {
    site: &'a Site,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    /// Load all publishable posts, newest first
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let posts_dir = &self.site.posts_dir;
        if !posts_dir.exists() {
            tracing::warn!("Posts directory {:?} does not exist", posts_dir);
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(posts_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                match self.load_post(path) {
                    Ok(post) => {
                        if post.published || self.site.config.render_drafts {
                            posts.push(post);
                        } else {
                            tracing::debug!("Skipping unpublished post {:?}", path);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load post {:?}: {}", path, e);
                    }
                }
            }
        }

        // Sort by date descending (newest first), slug for a stable order
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));

        Ok(posts)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> Result<Post> {
        let content = fs::read_to_string(path)?;
        let (fm, _body) = FrontMatter::parse(&content);

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled");
        let (stem_date, stem_slug) = split_dated_stem(stem);

        // Date: front-matter, then filename prefix, then file mtime
        let date = match fm.parse_date().or(stem_date) {
            Some(date) => date,
            None => {
                if fm.date.is_some() {
                    tracing::warn!("Unrecognized date in {:?}, using file time", path);
                }
                let metadata = fs::metadata(path)?;
                metadata
                    .modified()
                    .ok()
                    .map(DateTime::<Local>::from)
                    .unwrap_or_else(Local::now)
            }
        };

        let title = fm.title.unwrap_or_else(|| stem.to_string());
        // Front-matter slugs become file names, so keep them to one path segment
        let slug = fm
            .slug
            .map(slug::slugify)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| stem_slug.to_string());

        let source = path
            .strip_prefix(&self.site.posts_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        let mut post = Post::new(title, date, slug);
        post.tags = fm.tags;
        post.source = source;
        post.full_source = path.to_path_buf();
        post.published = fm.published;
        post.extra = fm.extra;

        Ok(post)
    }
}

/// Split `2024-01-15-slug` into its date and slug; other stems are all slug
fn split_dated_stem(stem: &str) -> (Option<DateTime<Local>>, &str) {
    if let Some(caps) = DATED_STEM.captures(stem) {
        if let Some(date) = parse_date_string(&caps[1]) {
            let slug = caps.get(2).map_or(stem, |m| m.as_str());
            return (Some(date), slug);
        }
    }
    (None, stem)
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    fn site_with_posts(posts: &[(&str, &str)], render_drafts: bool) -> (TempDir, Site) {
        let dir = TempDir::new().unwrap();
        let config = SiteConfig {
            render_drafts,
            ..Default::default()
        };
        let site = Site::with_config(dir.path().to_path_buf(), config);
        fs::create_dir_all(&site.posts_dir).unwrap();
        for (name, content) in posts {
            fs::write(site.posts_dir.join(name), content).unwrap();
        }
        (dir, site)
    }

    #[test]
    fn test_date_and_slug_from_filename() {
        let (_dir, site) = site_with_posts(
            &[(
                "2009-06-01-looking-for-django-cms.md",
                "# Looking for a Django CMS\n- tags: django\n\n---\n\nBody\n",
            )],
            false,
        );

        let posts = ContentLoader::new(&site).load_posts().unwrap();
        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.title, "Looking for a Django CMS");
        assert_eq!(post.slug, "looking-for-django-cms");
        assert_eq!(post.date.format("%Y-%m-%d").to_string(), "2009-06-01");
        assert_eq!(post.tags, vec!["django"]);
        assert_eq!(post.source, "2009-06-01-looking-for-django-cms.md");
    }

    #[test]
    fn test_frontmatter_overrides_filename() {
        let (_dir, site) = site_with_posts(
            &[(
                "2009-06-01-old-name.md",
                "---\ntitle: Renamed\ndate: 2010-02-03\nslug: new-name\n---\nBody\n",
            )],
            false,
        );

        let posts = ContentLoader::new(&site).load_posts().unwrap();
        assert_eq!(posts[0].slug, "new-name");
        assert_eq!(posts[0].date.format("%Y-%m-%d").to_string(), "2010-02-03");
    }

    #[test]
    fn test_frontmatter_slug_stays_in_one_segment() {
        let (_dir, site) = site_with_posts(
            &[
                ("2020-01-01-up.md", "# Up\n- slug: ../../../escaped\n---\n"),
                ("2020-01-02-nested.md", "# Nested\n- slug: Nested/Dir Name\n---\n"),
                ("2020-01-03-dots.md", "---\ntitle: Dots\nslug: \"..\"\n---\n"),
            ],
            false,
        );

        let posts = ContentLoader::new(&site).load_posts().unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["dots", "nested-dir-name", "escaped"]);
        for post in &posts {
            assert_eq!(site.card_path(&post.slug).parent(), Some(site.images_dir.as_path()));
        }
    }

    #[test]
    fn test_undated_filename_uses_stem() {
        let (_dir, site) = site_with_posts(&[("about-me.md", "Just text.\n")], false);

        let posts = ContentLoader::new(&site).load_posts().unwrap();
        assert_eq!(posts[0].title, "about-me");
        assert_eq!(posts[0].slug, "about-me");
    }

    #[test]
    fn test_drafts_and_sorting() {
        let posts = [
            ("2020-01-01-first.md", "# First\n---\n"),
            ("2022-01-01-third.md", "# Third\n---\n"),
            ("2021-01-01-second.md", "# Second\n- public: false\n---\n"),
            ("notes.txt", "# Not a post\n---\n"),
        ];

        let (_dir, site) = site_with_posts(&posts, false);
        let loaded = ContentLoader::new(&site).load_posts().unwrap();
        let slugs: Vec<_> = loaded.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["third", "first"]);

        let (_dir, site) = site_with_posts(&posts, true);
        let loaded = ContentLoader::new(&site).load_posts().unwrap();
        let slugs: Vec<_> = loaded.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_missing_posts_dir() {
        let dir = TempDir::new().unwrap();
        let site = Site::with_config(dir.path().to_path_buf(), SiteConfig::default());
        assert!(ContentLoader::new(&site).load_posts().unwrap().is_empty());
    }

    #[test]
    fn test_split_dated_stem() {
        let (date, slug) = split_dated_stem("2024-02-30-not-a-date");
        assert!(date.is_none());
        assert_eq!(slug, "2024-02-30-not-a-date");

        let (date, slug) = split_dated_stem("2024-02-29-leap");
        assert!(date.is_some());
        assert_eq!(slug, "leap");
    }
}
