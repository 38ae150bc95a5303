//! Helper functions shared by pages, templates and the sitemap

mod date;
mod url;

pub use date::*;
pub use url::*;

/// Escape text for XML element content and attributes
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
