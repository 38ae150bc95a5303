//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub author: String,
    pub description: String,
    pub url: String,

    // Home page
    pub headline: String,
    pub tagline: String,
    pub home_projects: usize,

    // Directory
    pub blog_dir: String,
    pub projects_dir: String,
    pub entry_file: String,
    pub about_file: String,
    pub static_dir: String,
    pub public_dir: String,

    /// Show error details on error pages
    pub debug: bool,

    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub bundle: BundleConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "JRAR.DEV".to_string(),
            author: "Josh Rarick".to_string(),
            description: "Welcome to my site".to_string(),
            url: "https://www.jrar.dev".to_string(),

            headline: "I'm Josh, a full stack engineer".to_string(),
            tagline: "I build websites and web apps with Next.js, Remix, Python, Node ect. \
                      I also write stuff on my blog."
                .to_string(),
            home_projects: 3,

            blog_dir: "content/blog".to_string(),
            projects_dir: "content/projects".to_string(),
            entry_file: "page.md".to_string(),
            about_file: "content/about.md".to_string(),
            static_dir: "static".to_string(),
            public_dir: "public".to_string(),

            debug: false,

            highlight: HighlightConfig::default(),
            bundle: BundleConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Name of a syntect bundled theme
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Content bundling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Images larger than this many bytes are not embedded as data URIs
    pub inline_limit: u64,
    /// Maximum number of bundles compiled at once while listing
    pub concurrency: usize,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            inline_limit: 2 * 1024 * 1024,
            concurrency: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.url, "https://www.jrar.dev");
        assert_eq!(config.blog_dir, "content/blog");
        assert_eq!(config.home_projects, 3);
        assert_eq!(config.bundle.concurrency, 16);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Site
url: https://example.com
entry_file: page.mdx
highlight:
  theme: InspiredGitHub
bundle:
  concurrency: 4
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Site");
        assert_eq!(config.entry_file, "page.mdx");
        assert_eq!(config.highlight.theme, "InspiredGitHub");
        assert_eq!(config.bundle.concurrency, 4);
        // untouched keys keep their defaults
        assert_eq!(config.bundle.inline_limit, 2 * 1024 * 1024);
        assert_eq!(config.projects_dir, "content/projects");
    }
}
