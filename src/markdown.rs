//! Converts document bodies from markdown to HTML.

use pulldown_cmark::{html, Event, Options, Parser, Tag};

/// The result of rendering a markdown body.
pub struct Rendered {
    /// The HTML output.
    pub html: String,

    /// The number of words in the body's text (markup and link targets are
    /// not counted).
    pub word_count: usize,
}

/// Converts `markdown` to HTML. Raw HTML (including summary markers such as
/// `<!-- more -->`) passes through untouched.
pub fn to_html(markdown: &str) -> Rendered {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    // Text events are split at arbitrary points (e.g., around smart quotes),
    // so words are counted once the text is reassembled.
    let mut text = String::new();
    let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(
        &mut html_output,
        Parser::new_ext(markdown, options).inspect(|ev| match ev {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(
                Tag::Paragraph
                | Tag::Heading(..)
                | Tag::Item
                | Tag::CodeBlock(_)
                | Tag::TableCell
                | Tag::BlockQuote,
            ) => text.push(' '),
            _ => {}
        }),
    );

    Rendered {
        html: html_output,
        word_count: text.split_whitespace().count(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_html() {
        let rendered = to_html("# Hello\n\nIt's *nice* to [meet](https://example.com) you.\n");
        assert_eq!(
            "<h1>Hello</h1>\n<p>It’s <em>nice</em> to <a href=\"https://example.com\">meet</a> you.</p>\n",
            rendered.html,
        );
        assert_eq!(6, rendered.word_count);
    }

    #[test]
    fn test_summary_marker_survives() {
        let rendered = to_html("First.\n\n<!-- more -->\n\nSecond.\n");
        assert!(rendered.html.contains("<!-- more -->"));
        assert_eq!(2, rendered.word_count);
    }
}
