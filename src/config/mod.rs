//! Configuration module

mod site;

pub use site::BundleConfig;
pub use site::HighlightConfig;
pub use site::SiteConfig;
