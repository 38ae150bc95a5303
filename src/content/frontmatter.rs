//! Front-matter parsing and the per-collection schemas

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::ContentItem;
use crate::error::{BuildError, Result};

/// Typed front-matter record of one collection
pub trait Frontmatter: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Collection name, used as the key of listing payloads
    const COLLECTION: &'static str;

    /// Required string fields as (name, value) pairs
    fn required(&self) -> Vec<(&'static str, &str)>;

    /// Order a freshly listed collection. Enumeration order by default.
    fn sort(_items: &mut [ContentItem<Self>]) {}

    /// Reject records with blank required fields
    fn validate(&self, slug: &str) -> Result<()> {
        require_non_blank(slug, self.required())
    }
}

/// Front-matter of a blog article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleFrontmatter {
    pub title: String,
    pub subtitle: String,
    pub category: String,
    /// Expected as a zero-padded ISO date; listings compare it as a string
    pub date_published: String,
}

impl Frontmatter for ArticleFrontmatter {
    const COLLECTION: &'static str = "articles";

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("title", &self.title),
            ("subtitle", &self.subtitle),
            ("category", &self.category),
            ("datePublished", &self.date_published),
        ]
    }

    /// Newest first
    fn sort(items: &mut [ContentItem<Self>]) {
        items.sort_by(|a, b| {
            b.frontmatter
                .date_published
                .cmp(&a.frontmatter.date_published)
        });
    }

    fn validate(&self, slug: &str) -> Result<()> {
        require_non_blank(slug, self.required())?;

        if !is_sortable_date(&self.date_published) {
            tracing::warn!(
                "'{}' has datePublished '{}', which does not start with YYYY-MM-DD; \
                 article ordering may be wrong",
                slug,
                self.date_published
            );
        }

        Ok(())
    }
}

/// Front-matter of a portfolio project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFrontmatter {
    pub title: String,
    pub description: String,
}

impl Frontmatter for ProjectFrontmatter {
    const COLLECTION: &'static str = "projects";

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("title", &self.title), ("description", &self.description)]
    }
}

/// Split a document into its YAML front-matter block and the remaining body
///
/// The block must open the document with a `---` line and be closed by
/// another `---` line.
pub fn split(content: &str) -> Option<(&str, &str)> {
    let content = content.trim_start_matches('\u{feff}').trim_start();

    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == "---" {
            let yaml = &content[start..offset];
            let body = &content[offset + line.len()..];
            return Some((yaml, body.trim_start_matches(['\n', '\r'])));
        }
        offset += line.len();
    }

    None
}

/// Parse the front-matter of `content` into `F`, returning it with the body
pub fn parse<'a, F: Frontmatter>(slug: &str, content: &'a str) -> Result<(F, &'a str)> {
    let (yaml, body) =
        split(content).ok_or_else(|| BuildError::schema(slug, "missing front-matter block"))?;

    if yaml.trim().is_empty() {
        return Err(BuildError::schema(slug, "front-matter block is empty"));
    }

    let fm: F = serde_yaml::from_str(yaml).map_err(|e| BuildError::schema(slug, e.to_string()))?;
    fm.validate(slug)?;

    Ok((fm, body))
}

fn require_non_blank(slug: &str, fields: Vec<(&'static str, &str)>) -> Result<()> {
    match fields.into_iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(BuildError::schema(
            slug,
            format!("required field `{}` is empty", name),
        )),
        None => Ok(()),
    }
}

/// Whether a date string begins with a zero-padded `YYYY-MM-DD` date
fn is_sortable_date(s: &str) -> bool {
    s.get(..10)
        .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok())
        .unwrap_or(false)
}
