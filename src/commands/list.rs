//! List posts and where their cards go

use anyhow::Result;
use std::path::Path;

use crate::content::loader::ContentLoader;
use crate::Site;

/// Print every publishable post with its card destination
pub fn run(site: &Site) -> Result<()> {
    let posts = ContentLoader::new(site).load_posts()?;

    println!("Posts ({}):", posts.len());
    for post in &posts {
        let card = site.card_path(&post.slug);
        let card = card.strip_prefix(&site.base_dir).unwrap_or(&card);
        println!(
            "  {} - {} [{}]{}",
            post.date.format("%Y-%m-%d"),
            post.title,
            card.display(),
            card_status(&site.base_dir.join(card))
        );
    }

    Ok(())
}

fn card_status(path: &Path) -> &'static str {
    if path.exists() {
        ""
    } else {
        " (missing)"
    }
}
