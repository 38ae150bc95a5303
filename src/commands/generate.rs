//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Site;

/// Prerender the whole site into the public directory
pub async fn run(site: &Site) -> Result<()> {
    let start = std::time::Instant::now();

    let stats = Generator::new(site)?.generate().await?;

    tracing::info!(
        "Generated {} pages and copied {} assets in {:.2?}",
        stats.pages,
        stats.assets,
        start.elapsed()
    );
    Ok(())
}
