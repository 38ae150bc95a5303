//! Bundle every item and report what is broken

use anyhow::Result;

use crate::content::{Frontmatter, Listing};
use crate::Site;

/// Check both collections, reporting every failure instead of the first
pub async fn run(site: &Site) -> Result<()> {
    let articles = site.articles().list_report().await?;
    let projects = site.projects().list_report().await?;

    let failed = report(&articles) + report(&projects);
    if failed > 0 {
        anyhow::bail!("{} item(s) failed to bundle", failed);
    }

    println!("All content bundled successfully.");
    Ok(())
}

/// Print one collection's results, returning the number of failures
fn report<F: Frontmatter>(listing: &Listing<F>) -> usize {
    println!(
        "{}: {} ok, {} failed",
        F::COLLECTION,
        listing.items.len(),
        listing.errors.len()
    );

    let slugs = listing
        .items
        .iter()
        .map(|item| item.slug.as_str())
        .chain(listing.errors.iter().map(|(slug, _)| slug.as_str()));
    for slug in slugs {
        if !is_url_safe(slug) {
            tracing::warn!(
                "{} slug {:?} is not URL-safe (suggested: {:?})",
                F::COLLECTION,
                slug,
                slug::slugify(slug)
            );
        }
    }

    for (slug, error) in &listing.errors {
        println!("  {}: {}", slug, error);
    }

    listing.errors.len()
}

/// A slug is URL-safe when slugifying leaves it unchanged
fn is_url_safe(slug: &str) -> bool {
    slug::slugify(slug) == slug
}
