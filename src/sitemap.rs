//! XML sitemap over the static routes and every content slug

use anyhow::Result;

use crate::helpers::{escape_xml, full_url_for};
use crate::routes::{self, static_pages};
use crate::Site;

/// One `<url>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: String,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

/// Collect sitemap entries for the given slugs
///
/// Static routes come first, then articles, then projects.
pub fn entries(base_url: &str, articles: &[String], projects: &[String]) -> Vec<SitemapEntry> {
    let mut entries: Vec<SitemapEntry> = static_pages()
        .map(|route| {
            let home = route.path.is_empty();
            SitemapEntry {
                loc: full_url_for(base_url, route.path),
                changefreq: if home { "weekly" } else { "monthly" },
                priority: if home { "1.0" } else { "0.8" },
            }
        })
        .collect();

    entries.extend(articles.iter().map(|slug| SitemapEntry {
        loc: full_url_for(base_url, &routes::post_path(slug)),
        changefreq: "yearly",
        priority: "0.6",
    }));

    entries.extend(projects.iter().map(|slug| SitemapEntry {
        loc: full_url_for(base_url, &routes::project_path(slug)),
        changefreq: "monthly",
        priority: "0.6",
    }));

    entries
}

/// Serialize entries as a sitemap document
pub fn render(entries: &[SitemapEntry]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');

    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.changefreq));
        xml.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Build the sitemap of a site from its slug directories only
pub async fn generate(site: &Site) -> Result<String> {
    let (articles, projects) = tokio::try_join!(site.article_slugs(), site.project_slugs())?;

    let mut articles = articles;
    let mut projects = projects;
    articles.sort();
    projects.sort();

    Ok(render(&entries(&site.config.url, &articles, &projects)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slugs(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_entries() {
        let entries = entries(
            "https://www.jrar.dev",
            &slugs(&["a", "b"]),
            &slugs(&["c"]),
        );

        let expected = vec![
            ("https://www.jrar.dev/", "weekly", "1.0"),
            ("https://www.jrar.dev/blog", "monthly", "0.8"),
            ("https://www.jrar.dev/work", "monthly", "0.8"),
            ("https://www.jrar.dev/about", "monthly", "0.8"),
            ("https://www.jrar.dev/blog/a", "yearly", "0.6"),
            ("https://www.jrar.dev/blog/b", "yearly", "0.6"),
            ("https://www.jrar.dev/work/c", "monthly", "0.6"),
        ];
        let actual: Vec<_> = entries
            .iter()
            .map(|e| (e.loc.as_str(), e.changefreq, e.priority))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_excludes_sitemap_and_templates() {
        let xml = render(&entries("https://example.com/", &[], &[]));
        assert!(!xml.contains("sitemap.xml"));
        assert!(!xml.contains(":slug"));
        assert_eq!(xml.matches("<url>").count(), 4);
    }

    #[test]
    fn test_render_document() {
        let xml = render(&entries("https://example.com", &slugs(&["a & b"]), &[]));
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
        assert!(xml.contains("<loc>https://example.com/blog/a%20&amp;%20b</loc>"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }
}
