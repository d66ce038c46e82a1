//! Splits rendered documents into a teaser and the rest of the body. Authors
//! mark the cut point in the content itself (by default with
//! `<!-- more -->`), so there is never a separate summary field to keep in
//! sync with the body.

use pulldown_cmark::escape::{escape_href, escape_html};
use regex::Regex;
use std::borrow::Cow;

/// The marker used when the configuration doesn't name one.
pub const DEFAULT_SEPARATOR: &str = "<!-- more -->";

/// The label used for the read-more link when the configuration doesn't
/// name one.
pub const DEFAULT_READ_MORE: &str = "Continue reading";

/// The token which divides a document's teaser from the rest of its body.
#[derive(Clone, Debug)]
pub enum Separator {
    /// Matches an exact substring.
    Literal(String),

    /// Matches a regular expression. The span of the match (including any
    /// surrounding whitespace the expression consumes) is what gets cut.
    Pattern(Regex),
}

impl Separator {
    /// Builds a literal separator. Empty literals are rejected since they
    /// would truncate every document to nothing. A [`Summarizer`] further
    /// rejects separators that occur in its own read-more link.
    pub fn literal(marker: impl Into<String>) -> Result<Separator> {
        let marker = marker.into();
        if marker.is_empty() {
            return Err(Error::Empty);
        }
        Ok(Separator::Literal(marker))
    }

    /// Compiles a pattern separator. Patterns which match the empty string
    /// are rejected for the same reason empty literals are.
    pub fn pattern(pattern: &str) -> Result<Separator> {
        let regex = Regex::new(pattern)?;
        if regex.is_match("") {
            return Err(Error::MatchesEmpty(pattern.to_owned()));
        }
        Ok(Separator::Pattern(regex))
    }

    /// Returns the byte offset at which the first non-empty occurrence of the
    /// separator begins.
    fn find(&self, content: &str) -> Option<usize> {
        match self {
            Separator::Literal(marker) => content.find(marker.as_str()),
            Separator::Pattern(regex) => regex
                .find_iter(content)
                .find(|m| !m.as_str().is_empty())
                .map(|m| m.start()),
        }
    }
}

impl Default for Separator {
    fn default() -> Self {
        Separator::Literal(DEFAULT_SEPARATOR.to_owned())
    }
}

/// Derives teasers from document content.
#[derive(Clone, Debug)]
pub struct Summarizer {
    separator: Separator,
    read_more: String,
}

impl Default for Summarizer {
    fn default() -> Self {
        Summarizer {
            separator: Separator::default(),
            read_more: DEFAULT_READ_MORE.to_owned(),
        }
    }
}

impl Summarizer {
    /// Constructs a [`Summarizer`]. `read_more` is plain text; it is escaped
    /// when the call-to-action markup is generated.
    ///
    /// Fails if `separator` occurs in the read-more link itself, since a
    /// teaser would then be cut again on every extraction. The link URL is
    /// not known here, so a separator that only matches inside a document
    /// URL is not caught.
    pub fn new(separator: Separator, read_more: impl Into<String>) -> Result<Summarizer> {
        let summarizer = Summarizer {
            separator,
            read_more: read_more.into(),
        };
        if summarizer.has_summary(&summarizer.read_more_link("")) {
            return Err(Error::MatchesReadMore(summarizer.read_more));
        }
        Ok(summarizer)
    }

    /// Reports whether `content` contains the separator at all, i.e., whether
    /// a listing needs a read-more link for it.
    pub fn has_summary(&self, content: &str) -> bool {
        self.separator.find(content).is_some()
    }

    /// Returns everything before the first occurrence of the separator, or
    /// `None` if the separator doesn't occur.
    pub fn split<'c>(&self, content: &'c str) -> Option<&'c str> {
        self.separator.find(content).map(|i| &content[..i])
    }

    /// Returns the teaser for `content` followed by a link to `url`, or
    /// `content` itself (borrowed, untouched) when there is no separator.
    ///
    /// ```
    /// use folio::summary::Summarizer;
    ///
    /// let summarizer = Summarizer::default();
    /// let teaser = summarizer.extract_teaser(
    ///     "Intro text<!-- more -->Rest of article",
    ///     "/2021/03/hello/",
    /// );
    /// assert!(teaser.starts_with("Intro text<div class='read-more'>"));
    /// ```
    pub fn extract_teaser<'c>(&self, content: &'c str, url: &str) -> Cow<'c, str> {
        match self.split(content) {
            None => Cow::Borrowed(content),
            Some(teaser) => {
                let mut s = String::with_capacity(teaser.len() + 96);
                s.push_str(teaser);
                s.push_str(&self.read_more_link(url));
                Cow::Owned(s)
            }
        }
    }

    fn read_more_link(&self, url: &str) -> String {
        let mut s = String::from("<div class='read-more'><a href='");
        // writing into a `String` can't fail
        let _ = escape_href(&mut s, url);
        s.push_str("'>");
        let _ = escape_html(&mut s, &self.read_more);
        s.push_str(" &rsaquo;</a></div>");
        s
    }
}

/// The result of constructing a [`Separator`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an invalid separator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for an empty literal separator.
    #[error("summary separator must not be empty")]
    Empty,

    /// Returned for a pattern that matches the empty string.
    #[error("summary separator pattern `{0}` matches the empty string")]
    MatchesEmpty(String),

    /// Returned when the separator occurs in the read-more link, which would
    /// make teasers cut themselves again.
    #[error("summary separator occurs in the read-more link for label `{0}`")]
    MatchesReadMore(String),

    /// Returned when the pattern doesn't compile.
    #[error("invalid summary separator pattern: {0}")]
    Regex(#[from] regex::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const CTA: &str =
        "<div class='read-more'><a href='/a/'>Continue reading &rsaquo;</a></div>";

    #[test]
    fn test_extract_teaser_cuts_at_marker() {
        let summarizer = Summarizer::default();
        let teaser =
            summarizer.extract_teaser("Intro text<!-- more -->Rest of article", "/a/");
        assert_eq!(format!("Intro text{}", CTA), teaser);
    }

    #[test]
    fn test_extract_teaser_without_marker_is_unchanged() {
        let summarizer = Summarizer::default();
        let teaser = summarizer.extract_teaser("No marker here", "/a/");
        assert!(matches!(teaser, Cow::Borrowed("No marker here")));
        assert!(!summarizer.has_summary("No marker here"));
    }

    #[test]
    fn test_extract_teaser_is_idempotent() {
        let summarizer = Summarizer::default();
        let once = summarizer
            .extract_teaser("<p>a</p>\n<!-- more -->\n<p>b</p>", "/a/")
            .into_owned();
        let twice = summarizer.extract_teaser(&once, "/a/");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_extract_teaser_uses_first_marker() {
        let summarizer = Summarizer::default();
        let teaser = summarizer.extract_teaser("a<!-- more -->b<!-- more -->c", "/a/");
        assert_eq!(format!("a{}", CTA), teaser);
    }

    #[test]
    fn test_pattern_separator_consumes_its_own_whitespace_only() -> Result<()> {
        let summarizer = Summarizer::new(
            Separator::pattern(r"\s<!-- more -->\s")?,
            DEFAULT_READ_MORE,
        )?;
        let teaser = summarizer
            .extract_teaser("line one\r\nline two \n<!-- more -->\nrest", "/a/");
        assert_eq!(format!("line one\r\nline two {}", CTA), teaser);

        // the pattern requires surrounding whitespace, so a bare marker is
        // not a cut point
        assert!(!summarizer.has_summary("a<!-- more -->b"));
        Ok(())
    }

    #[test]
    fn test_split_returns_bare_teaser() {
        let summarizer = Summarizer::default();
        assert_eq!(Some("Intro "), summarizer.split("Intro <!-- more --> rest"));
        assert_eq!(None, summarizer.split("Intro"));
    }

    #[test]
    fn test_read_more_link_is_escaped() -> Result<()> {
        let summarizer = Summarizer::new(Separator::literal("--")?, "Read \"more\" <here>")?;
        assert_eq!(
            "a<div class='read-more'><a href='/x?a=1&amp;b=&#x27;2&#x27;%20c'>Read &quot;more&quot; &lt;here&gt; &rsaquo;</a></div>",
            summarizer.extract_teaser("a--b", "/x?a=1&b='2' c"),
        );
        Ok(())
    }

    #[test]
    fn test_separators_inside_read_more_link_are_rejected() -> Result<()> {
        assert!(matches!(
            Summarizer::new(Separator::literal("reading")?, DEFAULT_READ_MORE),
            Err(Error::MatchesReadMore(_))
        ));
        assert!(matches!(
            Summarizer::new(Separator::pattern("read-more")?, DEFAULT_READ_MORE),
            Err(Error::MatchesReadMore(_))
        ));

        // the same separator is fine once the label no longer contains it
        let summarizer = Summarizer::new(Separator::literal("reading")?, "More")?;
        let once = summarizer
            .extract_teaser("a reading b", "/a/")
            .into_owned();
        let twice = summarizer.extract_teaser(&once, "/a/");
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn test_empty_separators_are_rejected() {
        assert!(matches!(Separator::literal(""), Err(Error::Empty)));
        assert!(matches!(Separator::pattern("x*"), Err(Error::MatchesEmpty(_))));
        assert!(matches!(Separator::pattern("("), Err(Error::Regex(_))));
    }
}
