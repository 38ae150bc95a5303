//! Content module - per-slug bundling and collection listing

mod assets;
mod bundle;
mod collection;
pub mod frontmatter;
mod markdown;

pub use assets::{data_uri, AssetInliner};
pub use bundle::{Bundle, Bundler, ContentItem};
pub use collection::{list_slugs, Collection, Listing};
pub use frontmatter::{ArticleFrontmatter, Frontmatter, ProjectFrontmatter};
pub use markdown::{html_escape, MarkdownRenderer};

/// A listed blog article
pub type Article = ContentItem<ArticleFrontmatter>;

/// A listed portfolio project
pub type Project = ContentItem<ProjectFrontmatter>;
