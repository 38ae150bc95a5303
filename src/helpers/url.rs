//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped inside one path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generate a site-absolute URL path, encoding each segment
///
/// # Examples
/// ```ignore
/// url_for("blog/my post") // -> "/blog/my%20post"
/// ```
pub fn url_for(path: &str) -> String {
    let encoded: Vec<String> = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect();
    format!("/{}", encoded.join("/"))
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for("https://example.com/", "about") // -> "https://example.com/about"
/// ```
pub fn full_url_for(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), url_for(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for() {
        assert_eq!(url_for(""), "/");
        assert_eq!(url_for("/about"), "/about");
        assert_eq!(url_for("blog/my post"), "/blog/my%20post");
        assert_eq!(url_for("work/50%-off"), "/work/50%25-off");
    }

    #[test]
    fn test_full_url_for() {
        assert_eq!(full_url_for("https://example.com/", ""), "https://example.com/");
        assert_eq!(
            full_url_for("https://example.com", "blog/a"),
            "https://example.com/blog/a"
        );
    }
}
