//! Generator module - prerenders every route into static files

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::pages::Pages;
use crate::routes::{self, static_pages, Page};
use crate::{sitemap, Site};

/// Static site generator
pub struct Generator {
    pages: Pages,
    public_dir: PathBuf,
    static_dir: PathBuf,
}

/// What a generation run wrote
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerateStats {
    pub pages: usize,
    pub assets: usize,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        Ok(Self {
            pages: Pages::new(site.clone())?,
            public_dir: site.public_dir.clone(),
            static_dir: site.static_dir.clone(),
        })
    }

    /// Generate the entire site
    pub async fn generate(&self) -> Result<GenerateStats> {
        fs::create_dir_all(&self.public_dir)
            .with_context(|| format!("creating {}", self.public_dir.display()))?;

        let mut stats = GenerateStats {
            assets: self.copy_static_assets()?,
            ..GenerateStats::default()
        };

        // Static routes: home, blog, work, about
        for route in static_pages() {
            let html = self.pages.render(route.page, None).await?;
            self.write_page(route.path, &html)?;
            stats.pages += 1;
        }

        let site = self.pages.site();

        // Detail pages, one per slug found at build time
        for slug in site.article_slugs().await? {
            let html = self.pages.render(Page::BlogPost, Some(&slug)).await?;
            self.write_page(&routes::post_path(&slug), &html)?;
            stats.pages += 1;
        }

        for slug in site.project_slugs().await? {
            let html = self.pages.render(Page::Project, Some(&slug)).await?;
            self.write_page(&routes::project_path(&slug), &html)?;
            stats.pages += 1;
        }

        let xml = sitemap::generate(site).await?;
        self.write_file(&self.public_dir.join("sitemap.xml"), &xml)?;

        let not_found = self.pages.error(404, None);
        self.write_file(&self.public_dir.join("404.html"), &not_found)?;

        Ok(stats)
    }

    /// Write `<public>/<path>/index.html`
    fn write_page(&self, path: &str, html: &str) -> Result<()> {
        let dest = self.public_dir.join(path).join("index.html");
        self.write_file(&dest, html)
    }

    fn write_file(&self, dest: &Path, content: &str) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, content).with_context(|| format!("writing {}", dest.display()))?;
        tracing::info!("Generated: {}", display_relative(&self.public_dir, dest));
        Ok(())
    }

    /// Copy static assets (images, etc.) to public directory
    fn copy_static_assets(&self) -> Result<usize> {
        if !self.static_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(&self.static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(&self.static_dir)?;
            let dest = self.public_dir.join(relative);

            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::copy(path, &dest).with_context(|| format!("copying {}", path.display()))?;
            tracing::debug!("Copied: {}", relative.display());
            copied += 1;
        }

        Ok(copied)
    }
}

fn display_relative(base: &Path, path: &Path) -> String {
    path.strip_prefix(base).unwrap_or(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture(root: &Path) {
        write(
            &root.join("content/blog/first-post/page.md"),
            "---\ntitle: First\nsubtitle: One\ncategory: notes\ndatePublished: 2024-03-01\n---\nBody\n",
        );
        write(
            &root.join("content/projects/folio/page.md"),
            "---\ntitle: Folio\ndescription: This site\n---\nDetails\n",
        );
        write(&root.join("static/favicon.ico"), "icon");
        write(&root.join("static/img/logo.svg"), "<svg/>");
    }

    #[tokio::test]
    async fn test_generate_writes_every_route() {
        let root = TempDir::new().unwrap();
        fixture(root.path());
        let site = Site::new(root.path()).unwrap();

        let stats = Generator::new(&site).unwrap().generate().await.unwrap();
        assert_eq!(stats, GenerateStats { pages: 6, assets: 2 });

        let public = root.path().join("public");
        for page in [
            "index.html",
            "blog/index.html",
            "work/index.html",
            "about/index.html",
            "blog/first-post/index.html",
            "work/folio/index.html",
            "sitemap.xml",
            "404.html",
            "favicon.ico",
            "img/logo.svg",
        ] {
            assert!(public.join(page).is_file(), "missing {}", page);
        }

        let post = fs::read_to_string(public.join("blog/first-post/index.html")).unwrap();
        assert!(post.contains("<h1>First</h1>"));
    }

    #[tokio::test]
    async fn test_generate_fails_on_broken_item() {
        let root = TempDir::new().unwrap();
        fixture(root.path());
        write(
            &root.path().join("content/blog/broken/page.md"),
            "no front matter here\n",
        );
        let site = Site::new(root.path()).unwrap();

        assert!(Generator::new(&site).unwrap().generate().await.is_err());
    }
}
