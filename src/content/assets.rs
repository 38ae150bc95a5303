//! Embedding of co-located images as data URIs

use base64::{engine::general_purpose::STANDARD, Engine as _};
use percent_encoding::percent_decode_str;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::error::{BuildError, Result};

/// Extensions embedded inline instead of being requested separately
const INLINE_EXTENSIONS: [&str; 4] = ["png", "jpg", "svg", "gif"];

/// Resolves image references against one content directory
pub struct AssetInliner<'a> {
    dir: &'a Path,
    slug: &'a str,
    limit: u64,
}

impl<'a> AssetInliner<'a> {
    pub fn new(dir: &'a Path, slug: &'a str, limit: u64) -> Self {
        Self { dir, slug, limit }
    }

    /// Turn a local image reference into a data URI
    ///
    /// Returns `None` when the reference should be left as written: remote
    /// and site-absolute URLs and non-image files. Local images must resolve
    /// inside the directory and fit within the inline limit.
    pub fn inline(&self, reference: &str) -> Result<Option<String>> {
        if !is_local(reference) {
            return Ok(None);
        }

        let reference = reference
            .split(['?', '#'])
            .next()
            .unwrap_or(reference);
        let decoded = percent_decode_str(reference).decode_utf8_lossy();
        let relative = PathBuf::from(decoded.as_ref());

        let inlinable = relative
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| INLINE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !inlinable {
            return Ok(None);
        }

        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(BuildError::compile(
                self.slug,
                format!("image '{}' escapes the content directory", reference),
            ));
        }

        // Symlinks are followed before the containment check
        let path = match fs::canonicalize(self.dir.join(&relative)) {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BuildError::compile(
                    self.slug,
                    format!("image not found: {}", reference),
                ));
            }
            Err(e) => return Err(BuildError::fs(&self.dir.join(&relative), e)),
        };
        let dir = fs::canonicalize(self.dir).map_err(|e| BuildError::fs(self.dir, e))?;
        if !path.starts_with(&dir) {
            return Err(BuildError::compile(
                self.slug,
                format!("image '{}' escapes the content directory", reference),
            ));
        }

        let metadata = fs::metadata(&path).map_err(|e| BuildError::fs(&path, e))?;
        if !metadata.is_file() {
            return Err(BuildError::compile(
                self.slug,
                format!("image is not a file: {}", reference),
            ));
        }

        if metadata.len() > self.limit {
            return Err(BuildError::compile(
                self.slug,
                format!(
                    "image {} is {} bytes, over the inline limit of {}",
                    reference,
                    metadata.len(),
                    self.limit
                ),
            ));
        }

        let bytes = fs::read(&path).map_err(|e| BuildError::fs(&path, e))?;
        Ok(Some(data_uri(&relative, &bytes)))
    }
}

/// Encode bytes as a `data:` URI typed after the file extension
pub fn data_uri(path: &Path, bytes: &[u8]) -> String {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    format!("data:{};base64,{}", mime.essence_str(), STANDARD.encode(bytes))
}

/// Whether a reference points into the content directory
fn is_local(reference: &str) -> bool {
    let reference = reference.trim();
    !(reference.is_empty()
        || reference.starts_with('/')
        || reference.starts_with('#')
        || reference.contains("://")
        || reference.starts_with("data:")
        || reference.starts_with("mailto:"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("dot.png"), [0x89, b'P', b'N', b'G']).unwrap();
        fs::write(dir.path().join("my pic.gif"), b"GIF89a").unwrap();
        fs::write(dir.path().join("logo.svg"), "<svg/>").unwrap();
        fs::write(dir.path().join("notes.pdf"), b"%PDF").unwrap();
        fs::create_dir(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img/photo.jpg"), [0xff, 0xd8]).unwrap();
        dir
    }

    #[test]
    fn test_inline_png() {
        let dir = fixture();
        let inliner = AssetInliner::new(dir.path(), "post", 1024);
        let uri = inliner.inline("./dot.png").unwrap().unwrap();
        assert_eq!(uri, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_mime_types() {
        let dir = fixture();
        let inliner = AssetInliner::new(dir.path(), "post", 1024);
        let svg = inliner.inline("logo.svg").unwrap().unwrap();
        assert!(svg.starts_with("data:image/svg+xml;base64,"));
        let jpg = inliner.inline("img/photo.jpg").unwrap().unwrap();
        assert!(jpg.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_percent_encoded_reference() {
        let dir = fixture();
        let inliner = AssetInliner::new(dir.path(), "post", 1024);
        let uri = inliner.inline("my%20pic.gif").unwrap().unwrap();
        assert!(uri.starts_with("data:image/gif;base64,"));
    }

    #[test]
    fn test_untouched_references() {
        let dir = fixture();
        let inliner = AssetInliner::new(dir.path(), "post", 1024);
        assert!(inliner.inline("https://example.com/a.png").unwrap().is_none());
        assert!(inliner.inline("/assets/react-icon.svg").unwrap().is_none());
        assert!(inliner.inline("data:image/png;base64,AA==").unwrap().is_none());
        assert!(inliner.inline("notes.pdf").unwrap().is_none());
    }

    #[test]
    fn test_over_limit_is_compile_error() {
        let dir = fixture();
        let inliner = AssetInliner::new(dir.path(), "post", 2);
        let err = inliner.inline("dot.png").unwrap_err();
        assert!(matches!(err, BuildError::Compile { .. }));
        assert!(err.to_string().contains("inline limit"));
    }

    #[test]
    fn test_missing_image_is_compile_error() {
        let dir = fixture();
        let inliner = AssetInliner::new(dir.path(), "post", 1024);
        let err = inliner.inline("missing.png").unwrap_err();
        assert!(matches!(err, BuildError::Compile { .. }));
    }

    #[test]
    fn test_parent_reference_is_rejected() {
        let dir = fixture();
        let inliner = AssetInliner::new(dir.path(), "post", 1024);
        let err = inliner.inline("../other/dot.png").unwrap_err();
        assert!(err.to_string().contains("escapes"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_out_of_directory_is_rejected() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), "TOPSECRET").unwrap();

        let dir = fixture();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), dir.path().join("pic.png"))
            .unwrap();

        let inliner = AssetInliner::new(dir.path(), "post", 1024);
        let err = inliner.inline("pic.png").unwrap_err();
        assert!(matches!(err, BuildError::Compile { .. }));
        assert!(err.to_string().contains("escapes"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_directory_is_inlined() {
        let dir = fixture();
        std::os::unix::fs::symlink(dir.path().join("dot.png"), dir.path().join("alias.png"))
            .unwrap();

        let inliner = AssetInliner::new(dir.path(), "post", 1024);
        let uri = inliner.inline("alias.png").unwrap().unwrap();
        assert_eq!(uri, "data:image/png;base64,iVBORw==");
    }
}
