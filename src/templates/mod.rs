//! Built-in site templates using the Tera template engine
//!
//! Templates are embedded in the binary; rendered bundle HTML is passed
//! through with the `safe` filter, everything else is autoescaped.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::helpers::full_date;

/// Site-wide values available to every template as `site`
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub author: String,
    pub description: String,
    pub url: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            author: config.author.clone(),
            description: config.description.clone(),
            url: config.url.clone(),
        }
    }
}

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
    site: SiteData,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("about.html", include_str!("site/about.html")),
            ("blog.html", include_str!("site/blog.html")),
            ("post.html", include_str!("site/post.html")),
            ("work.html", include_str!("site/work.html")),
            ("project.html", include_str!("site/project.html")),
            ("error.html", include_str!("site/error.html")),
        ])?;

        tera.register_filter("date_format", date_format_filter);

        Ok(Self {
            tera,
            site: SiteData::from(config),
        })
    }

    /// Render a template with the given context plus `site`
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        let mut context = context.clone();
        context.insert("site", &self.site);
        Ok(self.tera.render(template_name, &context)?)
    }
}

/// Tera filter: format a published date for display
fn date_format_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    Ok(tera::Value::String(full_date(&s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_template() {
        let renderer = TemplateRenderer::new(&SiteConfig::default()).unwrap();
        let mut context = Context::new();
        context.insert("message", "404");
        context.insert("details", "The requested page could not be found.");
        context.insert("stack", &None::<String>);

        let html = renderer.render("error.html", &context).unwrap();
        assert!(html.contains("<h1>404</h1>"));
        assert!(html.contains("JRAR.DEV"));
        assert!(!html.contains("<pre>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let renderer = TemplateRenderer::new(&SiteConfig::default()).unwrap();
        let mut context = Context::new();
        context.insert("message", "Error");
        context.insert("details", "<script>");
        context.insert("stack", &None::<String>);

        let html = renderer.render("error.html", &context).unwrap();
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_date_format_filter() {
        let value = tera::Value::String("2024-01-15".to_string());
        let formatted = date_format_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(formatted, tera::Value::String("January 15, 2024".to_string()));
    }
}
