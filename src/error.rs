//! Errors raised while enumerating and bundling content

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to turn a content directory into a bundle
#[derive(Debug, Error)]
pub enum BuildError {
    /// A content root, slug directory or entry file could not be read
    #[error("cannot read {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Frontmatter is missing or does not match the collection schema
    #[error("invalid frontmatter in '{slug}': {message}")]
    Schema { slug: String, message: String },

    /// The markup could not be compiled
    #[error("failed to compile '{slug}': {message}")]
    Compile { slug: String, message: String },

    /// No content item exists under this slug
    #[error("no content found for '{0}'")]
    NotFound(String),
}

impl BuildError {
    pub(crate) fn fs(path: &Path, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn schema(slug: &str, message: impl Into<String>) -> Self {
        Self::Schema {
            slug: slug.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn compile(slug: &str, message: impl Into<String>) -> Self {
        Self::Compile {
            slug: slug.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error means the requested item does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
