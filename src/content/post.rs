//! Post model

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::render::RenderRequest;

/// A blog post, reduced to what a title card needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Post title, possibly HTML-escaped
    pub title: String,

    /// Publication date
    pub date: DateTime<Local>,

    /// Post tags
    pub tags: Vec<String>,

    /// Source file path (relative)
    pub source: String,

    /// Full source file path
    pub full_source: PathBuf,

    /// Whether the post is published
    pub published: bool,

    /// Slug (URL-friendly name)
    pub slug: String,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(title: String, date: DateTime<Local>, slug: String) -> Self {
        Self {
            title,
            date,
            tags: Vec::new(),
            source: String::new(),
            full_source: PathBuf::new(),
            published: true,
            slug,
            extra: HashMap::new(),
        }
    }

    /// The date line shown above the title
    pub fn subtitle(&self, date_format: &str) -> String {
        self.date.format(date_format).to_string()
    }

    /// Build the render request for this post's card
    pub fn card_request(&self, date_format: &str, output: PathBuf) -> RenderRequest {
        RenderRequest::new(self.title.clone(), self.subtitle(date_format), output)
    }
}
