//! List site content

use anyhow::Result;

use crate::Site;

/// List site content by type
pub async fn run(site: &Site, content_type: &str) -> Result<()> {
    match content_type {
        "article" | "articles" | "post" | "posts" => {
            let articles = site.list_all_articles().await?;
            println!("Articles ({}):", articles.len());
            for article in articles {
                let fm = &article.frontmatter;
                println!(
                    "  {} - {} [{}] ({})",
                    fm.date_published, fm.title, fm.category, article.slug
                );
            }
        }
        "project" | "projects" => {
            let projects = site.list_all_projects().await?;
            println!("Projects ({}):", projects.len());
            for project in projects {
                let fm = &project.frontmatter;
                println!("  {} - {} ({})", fm.title, fm.description, project.slug);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown content type: {}. Use: articles, projects",
                content_type
            );
        }
    }

    Ok(())
}
