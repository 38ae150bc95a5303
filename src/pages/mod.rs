//! Page handlers: load content for a route and render it to HTML

use anyhow::{Context as _, Result};
use std::io::ErrorKind;
use tera::Context;

use crate::content::AssetInliner;
use crate::error::BuildError;
use crate::routes::Page;
use crate::templates::TemplateRenderer;
use crate::Site;

/// Renders every page of the site
pub struct Pages {
    site: Site,
    templates: TemplateRenderer,
}

impl Pages {
    pub fn new(site: Site) -> Result<Self> {
        let templates = TemplateRenderer::new(&site.config)?;
        Ok(Self { site, templates })
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    /// Render a route; `slug` is required for detail pages
    pub async fn render(&self, page: Page, slug: Option<&str>) -> Result<String> {
        match (page, slug) {
            (Page::Home, _) => self.home().await,
            (Page::About, _) => self.about().await,
            (Page::Blog, _) => self.blog().await,
            (Page::Work, _) => self.work().await,
            (Page::BlogPost, Some(slug)) => self.post(slug).await,
            (Page::Project, Some(slug)) => self.project(slug).await,
            (page, _) => anyhow::bail!("{:?} cannot be rendered as an HTML page", page),
        }
    }

    /// Home page: hero plus the first few projects
    pub async fn home(&self) -> Result<String> {
        let mut projects = self.site.list_all_projects().await?;
        projects.truncate(self.site.config.home_projects);

        let mut context = Context::new();
        context.insert("headline", &self.site.config.headline);
        context.insert("tagline", &self.site.config.tagline);
        context.insert("projects", &projects);
        self.templates.render("home.html", &context)
    }

    /// About page, rendered from the about markdown file when it exists
    pub async fn about(&self) -> Result<String> {
        let path = self.site.about_path();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(markdown) => {
                let dir = path
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| self.site.base_dir.clone());
                let assets = AssetInliner::new(&dir, "about", self.site.config.bundle.inline_limit);
                Some(self.site.renderer.render(&markdown, &assets)?)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(BuildError::fs(&path, e).into()),
        };

        let mut context = Context::new();
        context.insert("content", &content);
        self.templates.render("about.html", &context)
    }

    /// Article index, newest first
    pub async fn blog(&self) -> Result<String> {
        let articles = self.site.list_all_articles().await?;

        let mut context = Context::new();
        context.insert("articles", &articles);
        self.templates.render("blog.html", &context)
    }

    /// One article
    pub async fn post(&self, slug: &str) -> Result<String> {
        let bundle = self.site.bundle_post(slug).await?;

        let context = Context::from_serialize(&bundle).context("serializing article")?;
        self.templates.render("post.html", &context)
    }

    /// Project index
    pub async fn work(&self) -> Result<String> {
        let projects = self.site.list_all_projects().await?;

        let mut context = Context::new();
        context.insert("projects", &projects);
        self.templates.render("work.html", &context)
    }

    /// One project
    pub async fn project(&self, slug: &str) -> Result<String> {
        let bundle = self.site.bundle_project(slug).await?;

        let context = Context::from_serialize(&bundle).context("serializing project")?;
        self.templates.render("project.html", &context)
    }

    /// Generic error page
    ///
    /// With `debug` enabled the error and its causes are shown.
    pub fn error(&self, status: u16, error: Option<&anyhow::Error>) -> String {
        let (message, details) = if status == 404 {
            ("404", "The requested page could not be found.".to_string())
        } else {
            ("Error", "An unexpected error occurred.".to_string())
        };

        let (details, stack) = match error {
            Some(e) if self.site.config.debug => (e.to_string(), Some(format!("{:?}", e))),
            _ => (details, None),
        };

        let mut context = Context::new();
        context.insert("message", message);
        context.insert("details", &details);
        context.insert("stack", &stack);

        self.templates
            .render("error.html", &context)
            .unwrap_or_else(|e| {
                tracing::error!("Failed to render error page: {:#}", e);
                format!("<h1>{}</h1><p>{}</p>", message, details)
            })
    }
}

/// HTTP status for an error raised while rendering a page
pub fn status_of(error: &anyhow::Error) -> u16 {
    match error.downcast_ref::<BuildError>() {
        Some(e) if e.is_not_found() => 404,
        _ => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site(root: &Path, debug: bool) -> Pages {
        write(
            &root.join("content/blog/hello/page.md"),
            "---\ntitle: Hello <World>\nsubtitle: First\ncategory: rust\ndatePublished: 2024-01-15\n---\n\
             ```rust\nfn main() {}\n```\n",
        );
        for (slug, title) in [("one", "One"), ("two", "Two"), ("three", "Three"), ("four", "Four")] {
            write(
                &root.join(format!("content/projects/{}/page.md", slug)),
                &format!("---\ntitle: {}\ndescription: about {}\n---\nDetails\n", title, slug),
            );
        }

        let config = SiteConfig {
            debug,
            ..SiteConfig::default()
        };
        Pages::new(Site::with_config(root, config).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_post_page() {
        let root = TempDir::new().unwrap();
        let html = site(root.path(), false).post("hello").await.unwrap();
        assert!(html.contains("<h1>Hello &lt;World&gt;</h1>"));
        assert!(html.contains(r#"<time datetime="2024-01-15">January 15, 2024</time>"#));
        assert!(html.contains(r#"<figure class="highlight" data-language="rust">"#));
    }

    #[tokio::test]
    async fn test_home_shows_three_projects() {
        let root = TempDir::new().unwrap();
        let html = site(root.path(), false).home().await.unwrap();
        assert_eq!(html.matches(r#"<article class="card">"#).count(), 3);
        assert!(html.contains("I&#x27;m Josh") || html.contains("I'm Josh"));
    }

    #[tokio::test]
    async fn test_blog_index_links_posts() {
        let root = TempDir::new().unwrap();
        let html = site(root.path(), false).blog().await.unwrap();
        assert!(html.contains(r#"href="/blog/hello""#));
    }

    #[tokio::test]
    async fn test_about_falls_back_without_file() {
        let root = TempDir::new().unwrap();
        let pages = site(root.path(), false);
        let html = pages.about().await.unwrap();
        assert!(html.contains("<h1>About</h1>"));

        write(&root.path().join("content/about.md"), "# Hi there\n");
        let html = pages.about().await.unwrap();
        assert!(html.contains("<h1>Hi there</h1>"));
    }

    #[tokio::test]
    async fn test_unknown_slug_is_404() {
        let root = TempDir::new().unwrap();
        let err = site(root.path(), false).project("missing").await.unwrap_err();
        assert_eq!(status_of(&err), 404);
    }

    #[tokio::test]
    async fn test_error_page_hides_details_outside_debug() {
        let root = TempDir::new().unwrap();
        let err = anyhow::anyhow!("secret failure");

        let html = site(root.path(), false).error(500, Some(&err));
        assert!(html.contains("An unexpected error occurred."));
        assert!(!html.contains("secret failure"));

        let html = site(root.path(), true).error(500, Some(&err));
        assert!(html.contains("secret failure"));
    }
}
