//! Markdown handling for post content.

use pulldown_cmark::{Event, Parser};

/// Maximum excerpt length in characters.
const MAX_EXCERPT_LENGTH: usize = 280;

/// Render a plain-text excerpt from markdown content.
///
/// Strips all markup and code blocks, collapses whitespace, and truncates
/// to [`MAX_EXCERPT_LENGTH`] characters with an ellipsis.
#[must_use]
pub fn render_excerpt(content: &str) -> String {
    let mut text = String::new();

    for event in Parser::new(content) {
        match event {
            Event::Text(t) => {
                if !text.is_empty() && !text.ends_with(' ') {
                    text.push(' ');
                }
                text.push_str(t.trim());
            }
            Event::Code(c) => {
                if !text.is_empty() && !text.ends_with(' ') {
                    text.push(' ');
                }
                text.push_str(&c);
            }
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }

        if text.chars().count() > MAX_EXCERPT_LENGTH {
            break;
        }
    }

    let collapsed: String = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= MAX_EXCERPT_LENGTH {
        collapsed
    } else {
        let truncated: String = collapsed.chars().take(MAX_EXCERPT_LENGTH).collect();
        format!("{}…", truncated.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_strips_markup() {
        let md = "# Heading\n\nSome **bold** and *italic* text with a [link](https://example.com).";
        let excerpt = render_excerpt(md);
        assert_eq!(excerpt, "Heading Some bold and italic text with a link .");
    }

    #[test]
    fn test_excerpt_keeps_inline_code() {
        let excerpt = render_excerpt("Run `cargo test` before pushing.");
        assert!(excerpt.contains("cargo test"));
    }

    #[test]
    fn test_excerpt_truncates_long_content() {
        let long = "word ".repeat(200);
        let excerpt = render_excerpt(&long);
        assert!(excerpt.chars().count() <= MAX_EXCERPT_LENGTH + 1);
        assert!(excerpt.ends_with('…'));
    }

    #[test]
    fn test_excerpt_empty_content() {
        assert_eq!(render_excerpt(""), "");
    }
}
