//! folio: a portfolio and blog site built from per-slug markdown bundles
//!
//! Articles and projects live one directory per slug. Each directory is
//! bundled into rendered HTML plus typed front-matter on demand, then
//! served by the axum server or prerendered into static files.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod pages;
pub mod routes;
pub mod server;
pub mod sitemap;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use content::{
    Article, ArticleFrontmatter, Bundle, Bundler, Collection, MarkdownRenderer, Project,
    ProjectFrontmatter,
};

/// The site: configuration plus its two content collections
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static asset directory
    pub static_dir: PathBuf,
    /// Markdown renderer shared by every bundle
    pub renderer: Arc<MarkdownRenderer>,
    articles: Arc<Collection<ArticleFrontmatter>>,
    projects: Arc<Collection<ProjectFrontmatter>>,
}

impl Site {
    /// Open a site directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Self::with_config(base_dir, config)
    }

    /// Build a site from an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let renderer = Arc::new(MarkdownRenderer::new(&config.highlight.theme)?);

        let articles = Collection::new(
            Bundler::new(
                base_dir.join(&config.blog_dir),
                config.entry_file.clone(),
                config.bundle.inline_limit,
                Arc::clone(&renderer),
            ),
            config.bundle.concurrency,
        );
        let projects = Collection::new(
            Bundler::new(
                base_dir.join(&config.projects_dir),
                config.entry_file.clone(),
                config.bundle.inline_limit,
                Arc::clone(&renderer),
            ),
            config.bundle.concurrency,
        );

        Ok(Self {
            public_dir: base_dir.join(&config.public_dir),
            static_dir: base_dir.join(&config.static_dir),
            config,
            base_dir,
            renderer,
            articles: Arc::new(articles),
            projects: Arc::new(projects),
        })
    }

    /// Article collection
    pub fn articles(&self) -> &Collection<ArticleFrontmatter> {
        &self.articles
    }

    /// Project collection
    pub fn projects(&self) -> &Collection<ProjectFrontmatter> {
        &self.projects
    }

    /// Path of the about page source
    pub fn about_path(&self) -> PathBuf {
        self.base_dir.join(&self.config.about_file)
    }

    /// Slugs of every article, in filesystem order
    pub async fn article_slugs(&self) -> error::Result<Vec<String>> {
        self.articles.slugs().await
    }

    /// Slugs of every project, in filesystem order
    pub async fn project_slugs(&self) -> error::Result<Vec<String>> {
        self.projects.slugs().await
    }

    /// Bundle one article
    pub async fn bundle_post(&self, slug: &str) -> error::Result<Bundle<ArticleFrontmatter>> {
        self.articles.bundle(slug).await
    }

    /// Bundle one project
    pub async fn bundle_project(&self, slug: &str) -> error::Result<Bundle<ProjectFrontmatter>> {
        self.projects.bundle(slug).await
    }

    /// Every article, newest first
    pub async fn list_all_articles(&self) -> error::Result<Vec<Article>> {
        self.articles.list_all().await
    }

    /// Every project, in filesystem order
    pub async fn list_all_projects(&self) -> error::Result<Vec<Project>> {
        self.projects.list_all().await
    }
}
