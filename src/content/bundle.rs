//! Bundling of one content directory into rendered HTML plus front-matter

use serde::Serialize;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::assets::AssetInliner;
use super::frontmatter::{self, Frontmatter};
use super::MarkdownRenderer;
use crate::error::{BuildError, Result};

/// Output of bundling one slug
#[derive(Debug, Clone, Serialize)]
pub struct Bundle<F> {
    /// Directory name the bundle was built from
    #[serde(skip)]
    pub slug: String,

    /// Rendered HTML fragment
    pub code: String,

    pub frontmatter: F,
}

impl<F> Bundle<F> {
    /// Drop the rendered body, keeping the listing record
    pub fn into_item(self) -> ContentItem<F> {
        ContentItem {
            slug: self.slug,
            frontmatter: self.frontmatter,
        }
    }
}

/// A listed content item: its slug plus the front-matter fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentItem<F> {
    /// Always the directory name, never a front-matter value
    pub slug: String,

    #[serde(flatten)]
    pub frontmatter: F,
}

/// Compiles entry files below one content root
pub struct Bundler<F> {
    root: PathBuf,
    entry_file: String,
    inline_limit: u64,
    renderer: Arc<MarkdownRenderer>,
    _schema: PhantomData<fn() -> F>,
}

impl<F: Frontmatter> Bundler<F> {
    pub fn new(
        root: impl Into<PathBuf>,
        entry_file: impl Into<String>,
        inline_limit: u64,
        renderer: Arc<MarkdownRenderer>,
    ) -> Self {
        Self {
            root: root.into(),
            entry_file: entry_file.into(),
            inline_limit,
            renderer,
            _schema: PhantomData,
        }
    }

    /// Collection root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a slug, rejecting anything that is not a plain name
    pub fn slug_dir(&self, slug: &str) -> Result<PathBuf> {
        if slug.is_empty() || slug == "." || slug == ".." || slug.contains(['/', '\\']) {
            return Err(BuildError::NotFound(slug.to_string()));
        }
        Ok(self.root.join(slug))
    }

    /// Bundle the entry file of `slug`
    pub async fn bundle(&self, slug: &str) -> Result<Bundle<F>> {
        let dir = self.slug_dir(slug)?;

        match tokio::fs::metadata(&dir).await {
            Ok(m) if m.is_dir() => {}
            Ok(_) => return Err(BuildError::NotFound(slug.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BuildError::NotFound(slug.to_string()))
            }
            Err(e) => return Err(BuildError::fs(&dir, e)),
        }

        let entry = dir.join(&self.entry_file);
        let bytes = tokio::fs::read(&entry)
            .await
            .map_err(|e| BuildError::fs(&entry, e))?;
        let content = String::from_utf8(bytes).map_err(|e| {
            BuildError::compile(slug, format!("{} is not valid UTF-8: {}", self.entry_file, e))
        })?;

        tracing::debug!("Bundling {}/{}", F::COLLECTION, slug);

        let renderer = Arc::clone(&self.renderer);
        let slug = slug.to_string();
        let limit = self.inline_limit;
        let task_slug = slug.clone();
        tokio::task::spawn_blocking(move || {
            compile::<F>(&renderer, &dir, &task_slug, &content, limit)
        })
        .await
        .map_err(|e| BuildError::compile(&slug, format!("bundling task failed: {}", e)))?
    }
}

fn compile<F: Frontmatter>(
    renderer: &MarkdownRenderer,
    dir: &Path,
    slug: &str,
    content: &str,
    inline_limit: u64,
) -> Result<Bundle<F>> {
    let (frontmatter, body) = frontmatter::parse::<F>(slug, content)?;
    let assets = AssetInliner::new(dir, slug, inline_limit);
    let code = renderer.render(body, &assets)?;

    Ok(Bundle {
        slug: slug.to_string(),
        code,
        frontmatter,
    })
}
