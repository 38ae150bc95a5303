//! Print the sitemap

use anyhow::Result;

use crate::Site;

pub async fn run(site: &Site) -> Result<()> {
    let xml = crate::sitemap::generate(site).await?;
    print!("{}", xml);
    Ok(())
}
