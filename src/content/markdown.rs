//! Markdown rendering with syntax highlighting and inline images

use anyhow::{anyhow, Result as AnyResult};
use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::{Captures, Regex};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::assets::AssetInliner;
use crate::error::Result;

lazy_static! {
    static ref IMG_SRC: Regex =
        Regex::new(r#"(?i)(<img\b[^>]*?\bsrc\s*=\s*)(["'])([^"']*)(["'])"#).unwrap();
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl MarkdownRenderer {
    /// Create a renderer highlighting with a bundled syntect theme
    pub fn new(theme_name: &str) -> AnyResult<Self> {
        let mut theme_set = ThemeSet::load_defaults();
        let theme = theme_set.themes.remove(theme_name).ok_or_else(|| {
            let mut known: Vec<_> = theme_set.themes.keys().cloned().collect();
            known.sort();
            anyhow!(
                "unknown highlight theme '{}' (available: {})",
                theme_name,
                known.join(", ")
            )
        })?;

        Ok(Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    /// Render markdown to an HTML fragment
    ///
    /// Local image references are resolved through `assets`.
    pub fn render(&self, markdown: &str, assets: &AssetInliner) -> Result<String> {
        // Front-matter is split off before rendering, so no metadata blocks
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().map(|l| l.to_string())
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let highlighted = self.highlight_code(&code, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    let dest_url = match assets.inline(&dest_url)? {
                        Some(uri) => CowStr::from(uri),
                        None => dest_url,
                    };
                    events.push(Event::Start(Tag::Image {
                        link_type,
                        dest_url,
                        title,
                        id,
                    }));
                }
                Event::Html(raw) => {
                    events.push(Event::Html(CowStr::from(inline_html_images(&raw, assets)?)));
                }
                Event::InlineHtml(raw) => {
                    events.push(Event::InlineHtml(CowStr::from(inline_html_images(
                        &raw, assets,
                    )?)));
                }
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        match highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme) {
            Ok(highlighted) => format!(
                r#"<figure class="highlight" data-language="{}">{}</figure>"#,
                html_escape(lang),
                highlighted
            ),
            Err(e) => {
                tracing::debug!("Highlighting {} failed: {}", lang, e);
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    html_escape(lang),
                    html_escape(code)
                )
            }
        }
    }
}

/// Rewrite `src` attributes of raw `<img>` tags
fn inline_html_images(raw: &str, assets: &AssetInliner) -> Result<String> {
    let mut output = String::with_capacity(raw.len());
    let mut last = 0;

    for caps in IMG_SRC.captures_iter(raw) {
        let (Some(whole), Some(src)) = (caps.get(0), caps.get(3)) else {
            continue;
        };
        if let Some(uri) = assets.inline(src.as_str())? {
            output.push_str(&raw[last..whole.start()]);
            output.push_str(&rebuild_src(&caps, &uri));
            last = whole.end();
        }
    }

    output.push_str(&raw[last..]);
    Ok(output)
}

fn rebuild_src(caps: &Captures, uri: &str) -> String {
    format!("{}{}{}{}", &caps[1], &caps[2], uri, &caps[4])
}

/// Simple HTML escaping
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use std::fs;
    use tempfile::TempDir;

    fn renderer() -> MarkdownRenderer {
        MarkdownRenderer::new("base16-ocean.dark").unwrap()
    }

    fn render(markdown: &str) -> Result<String> {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("dot.png"), [0x89, b'P', b'N', b'G']).unwrap();
        let assets = AssetInliner::new(dir.path(), "post", 1024);
        renderer().render(markdown, &assets)
    }

    #[test]
    fn test_render_basic_markdown() {
        let html = render("# Hello World\n\nThis is a test.").unwrap();
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let html = render("```rust title=\"main.rs\"\nfn main() {}\n```").unwrap();
        assert!(html.contains(r#"<figure class="highlight" data-language="rust">"#));
        assert!(html.contains("style="));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_code_block_text_is_not_duplicated() {
        let html = render("```\nlet marker = 1;\n```\n").unwrap();
        assert_eq!(html.matches("marker").count(), 1);
    }

    #[test]
    fn test_markdown_image_is_inlined() {
        let html = render("![a dot](./dot.png)").unwrap();
        assert!(html.contains(r#"src="data:image/png;base64,iVBORw==""#));
    }

    #[test]
    fn test_html_image_is_inlined() {
        let html = render("<img alt=\"dot\" src='dot.png' width=\"4\">\n").unwrap();
        assert!(html.contains("src='data:image/png;base64,iVBORw=='"));
        assert!(html.contains("width=\"4\""));
    }

    #[test]
    fn test_remote_image_untouched() {
        let html = render("![x](https://example.com/x.png)").unwrap();
        assert!(html.contains(r#"src="https://example.com/x.png""#));
    }

    #[test]
    fn test_missing_image_fails() {
        let err = render("![gone](gone.png)").unwrap_err();
        assert!(matches!(err, BuildError::Compile { .. }));
    }

    #[test]
    fn test_unknown_theme() {
        assert!(MarkdownRenderer::new("nord-but-missing").is_err());
    }
}
