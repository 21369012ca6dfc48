//! Front-matter parsing

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(split_list(value))
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Custom deserializer that keeps dates as text whether YAML typed them or not
fn string_or_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_yaml::Value::String(s)) => Some(s),
        Some(serde_yaml::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Front-matter data from a post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    #[serde(deserialize_with = "string_or_scalar", default)]
    pub date: Option<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,
    pub slug: Option<String>,
    /// Posts are published by default
    #[serde(default = "default_published", alias = "public")]
    pub published: bool,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// Default value for published field
fn default_published() -> bool {
    true
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            date: None,
            tags: Vec::new(),
            slug: None,
            published: true,
            extra: HashMap::new(),
        }
    }
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    ///
    /// Three header styles are understood:
    ///
    /// ```text
    /// ---                  # Title             # Title
    /// title: Title         - date: 2024-01-15  - tags: a, b
    /// tags: [a, b]         - tags: a, b
    /// ---                                      Body text
    ///                      ---
    /// Body text            Body text
    /// ```
    pub fn parse(content: &str) -> (Self, &str) {
        let trimmed = content.trim_start();

        // YAML front-matter (---)
        if trimmed.starts_with("---") {
            return Self::parse_yaml(trimmed);
        }

        // Header list closed by a --- line
        if let Some((header, body)) = split_at_separator(content) {
            if !header.trim().is_empty() {
                return (Self::parse_list(header), body);
            }
        }

        // Heading and tags line without a closing ---
        Self::parse_legacy(content)
    }

    fn parse_yaml(content: &str) -> (Self, &str) {
        // Find the closing ---
        let rest = &content[3..]; // Skip opening ---
        let rest = rest.trim_start_matches(['\n', '\r']);

        let Some(end_pos) = rest.find("\n---") else {
            // No closing ---, treat as no front-matter
            return (FrontMatter::default(), content);
        };

        let yaml_content = &rest[..end_pos];
        let remaining = &rest[end_pos + 4..]; // Skip \n---
        let remaining = remaining.trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return (FrontMatter::default(), remaining);
        }

        // A --- fenced block of prose is a thematic break, not YAML
        if !has_yaml_structure(yaml_content) {
            return (FrontMatter::default(), content);
        }

        match serde_yaml::from_str::<FrontMatter>(yaml_content) {
            Ok(fm) => (fm, remaining),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse YAML front-matter, treating as content: {}",
                    e
                );
                (FrontMatter::default(), content)
            }
        }
    }

    fn parse_list(header: &str) -> Self {
        let mut fm = FrontMatter::default();
        for line in header.lines() {
            fm.apply_header_line(line);
        }
        fm
    }

    fn parse_legacy(content: &str) -> (Self, &str) {
        let mut fm = FrontMatter::default();
        let mut body = content;

        if let Some((first, rest)) = split_first_line(body) {
            if first.starts_with("# ") {
                fm.apply_header_line(first);
                body = rest;

                if let Some((second, rest)) = split_first_line(body) {
                    if second.starts_with("- tags:") {
                        fm.apply_header_line(second);
                        body = rest;
                    }
                }
            }
        }

        (fm, body)
    }

    /// `# Title` or `- key: value`
    fn apply_header_line(&mut self, line: &str) {
        let line = line.trim();

        if let Some(title) = line.strip_prefix('#') {
            let title = title.trim_start_matches('#').trim();
            if !title.is_empty() && self.title.is_none() {
                self.title = Some(title.to_string());
            }
            return;
        }

        let Some(entry) = line.strip_prefix('-') else {
            return;
        };
        let Some((key, value)) = entry.split_once(':') else {
            return;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        match key.as_str() {
            "title" => self.title = Some(value.to_string()),
            "date" => self.date = Some(value.to_string()),
            "tags" | "tag" => self.tags = split_list(value),
            "slug" => self.slug = Some(value.to_string()),
            "public" | "published" => self.published = parse_bool(value),
            _ => {
                self.extra
                    .insert(key, serde_yaml::Value::String(value.to_string()));
            }
        }
    }

    /// Parse the date string into a DateTime
    pub fn parse_date(&self) -> Option<DateTime<Local>> {
        self.date.as_ref().and_then(|s| parse_date_string(s))
    }
}

/// Check that a --- block contains at least one `key: value` line
fn has_yaml_structure(yaml_content: &str) -> bool {
    yaml_content.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let before_colon = &trimmed[..colon_pos];
        // Key should be a simple ASCII identifier and not a URL scheme
        let is_valid_key = !before_colon.is_empty()
            && before_colon
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(before_colon, "http" | "https" | "ftp");
        if !is_valid_key {
            return false;
        }
        let after_colon = &trimmed[colon_pos + 1..];
        after_colon.is_empty() || after_colon.starts_with(' ')
    })
}

/// Split at the first line starting with `---`, dropping that line
fn split_at_separator(content: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.starts_with("---") {
            return Some((&content[..offset], &content[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn split_first_line(content: &str) -> Option<(&str, &str)> {
    if content.is_empty() {
        return None;
    }
    match content.find('\n') {
        Some(pos) => Some((content[..pos].trim_end_matches('\r'), &content[pos + 1..])),
        None => Some((content, "")),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> bool {
    !matches!(
        value.to_ascii_lowercase().as_str(),
        "false" | "no" | "off" | "0" | "draft"
    )
}

/// Parse a date string in various formats
pub(crate) fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    // Try various formats
    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return dt.and_local_timezone(Local).earliest();
        }
        // Try parsing date only
        if let Ok(d) = chrono::NaiveDate::parse_from_str(s, fmt) {
            let dt = d.and_hms_opt(0, 0, 0)?;
            return dt.and_local_timezone(Local).earliest();
        }
    }

    // Try RFC 3339 / ISO 8601
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15 10:30:00
tags:
  - rust
  - blog
slug: hello
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, Some("Hello World".to_string()));
        assert_eq!(fm.tags, vec!["rust", "blog"]);
        assert_eq!(fm.slug, Some("hello".to_string()));
        assert!(fm.published);
        assert!(remaining.starts_with("This is the content."));
    }

    #[test]
    fn test_parse_yaml_draft() {
        let content = "---\ntitle: Draft\npublished: false\n---\nBody\n";
        let (fm, _) = FrontMatter::parse(content);
        assert!(!fm.published);
    }

    #[test]
    fn test_parse_list_frontmatter() {
        let content = r#"# Building a Blog &amp; More

- date: 2012-03-04
- tags: python, liquidluck
- public: true
- summary: A short one

---

Body text here.
"#;

        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, Some("Building a Blog &amp; More".to_string()));
        assert_eq!(fm.date, Some("2012-03-04".to_string()));
        assert_eq!(fm.tags, vec!["python", "liquidluck"]);
        assert!(fm.published);
        assert_eq!(
            fm.extra.get("summary"),
            Some(&serde_yaml::Value::String("A short one".to_string()))
        );
        assert_eq!(remaining.trim(), "Body text here.");
    }

    #[test]
    fn test_parse_list_not_public() {
        let content = "# Hidden\n- public: false\n---\nBody\n";
        let (fm, _) = FrontMatter::parse(content);
        assert_eq!(fm.title, Some("Hidden".to_string()));
        assert!(!fm.published);
    }

    #[test]
    fn test_parse_legacy_frontmatter() {
        let content = "# Title Here\n- tags: tag 1, tags 2\n\nBody text here\n";
        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, Some("Title Here".to_string()));
        assert_eq!(fm.tags, vec!["tag 1", "tags 2"]);
        assert_eq!(remaining, "\nBody text here\n");
    }

    #[test]
    fn test_parse_legacy_title_only() {
        let content = "# Just a Title\nFirst paragraph.\n";
        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, Some("Just a Title".to_string()));
        assert!(fm.tags.is_empty());
        assert_eq!(remaining, "First paragraph.\n");
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "Plain text without any header.\n";
        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, None);
        assert_eq!(remaining, content);
    }

    #[test]
    fn test_broken_yaml_falls_back_to_body() {
        let content = "---\ntitle: [unclosed\ntags: a\n---\nBody\n";
        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, None);
        assert!(fm.published);
        assert_eq!(remaining, content);
    }

    #[test]
    fn test_parse_date() {
        let fm = FrontMatter {
            date: Some("2024-01-15 10:30:00".to_string()),
            ..Default::default()
        };

        let dt = fm.parse_date().unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 10:30");

        assert!(parse_date_string("2024/02/29").is_some());
        assert!(parse_date_string("2024-01-15T08:00:00+00:00").is_some());
        assert!(parse_date_string("last tuesday").is_none());
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = r#"---

Some random text with markdown lists:
- Item 1
- Item 2

---
More content here.
"#;

        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, None);
        assert!(remaining.contains("Some random text"));
    }

    #[test]
    fn test_content_with_url_not_yaml() {
        let content = r#"---

Check out https://example.com/path and http://test.com

---
More content.
"#;

        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, None);
        assert!(remaining.contains("https://example.com"));
    }
}
