//! Defines the [`Document`] type, the in-memory form of a source file after
//! parsing (see [`crate::parser`]), along with the [`Kind`] of content it
//! holds.

use crate::tag::Tag;
use chrono::{DateTime, FixedOffset};
use std::path::{Path, PathBuf};
use url::Url;

/// The kind of content a [`Document`] holds. The kind is determined by the
/// source directory the document was found in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A blog post, from `posts/`.
    Post,

    /// A standalone page (about, contact, ...), from `pages/`.
    Page,

    /// A portfolio entry, from `portfolio/`.
    Portfolio,
}

impl Kind {
    /// The source directory (relative to the project root) for the kind.
    pub fn source_directory(self) -> &'static str {
        match self {
            Kind::Post => "posts",
            Kind::Page => "pages",
            Kind::Portfolio => "portfolio",
        }
    }
}

/// A parsed source file.
#[derive(Clone, Debug)]
pub struct Document {
    /// The kind of content.
    pub kind: Kind,

    /// The source path relative to the project root, with a leading slash and
    /// without the extension (e.g., `/posts/2021/hello`). Pages live at the
    /// top level, so `pages/about.md` becomes `/about`. Navigation state is
    /// resolved against this value.
    pub identifier: String,

    /// The slugified file stem.
    pub slug: String,

    /// The title from the frontmatter.
    pub title: String,

    /// The creation timestamp from the frontmatter, if any. Undated
    /// documents sort after dated ones.
    pub created_at: Option<DateTime<FixedOffset>>,

    /// Whether the document is visible in production builds.
    pub published: bool,

    /// The document's tags, deduplicated, in frontmatter order.
    pub tags: Vec<Tag>,

    /// The navigation section declared in the frontmatter (`nav`), if any.
    pub section: Option<String>,

    /// The site-relative route, always beginning and ending with `/`
    /// (e.g., `/2021/03/hello/`).
    pub route: String,

    /// The absolute URL of the document's page.
    pub url: Url,

    /// The rendered HTML body.
    pub body: String,

    /// The number of words in the body text.
    pub word_count: usize,
}

impl Document {
    /// The location of the document's output file beneath `output_directory`.
    pub fn output_path(&self, output_directory: &Path) -> PathBuf {
        route_to_path(output_directory, &self.route)
    }
}

/// Converts a site-relative route into the `index.html` file that serves it.
pub fn route_to_path(output_directory: &Path, route: &str) -> PathBuf {
    output_directory
        .join(route.trim_matches('/'))
        .join("index.html")
}

#[cfg(test)]
pub(crate) fn stub(identifier: &str, created_at: Option<&str>, published: bool) -> Document {
    let slug = identifier.rsplit('/').next().unwrap_or_default().to_owned();
    let route = format!("/{}/", slug);
    Document {
        kind: Kind::Post,
        identifier: identifier.to_owned(),
        title: slug.clone(),
        created_at: created_at.map(|s| DateTime::parse_from_rfc3339(s).unwrap()),
        published,
        tags: Vec::new(),
        section: None,
        url: Url::parse("https://example.com/").unwrap().join(&slug).unwrap(),
        route,
        slug,
        body: String::new(),
        word_count: 0,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_output_path() {
        let doc = stub("/posts/hello", None, true);
        assert_eq!(
            PathBuf::from("/out/hello/index.html"),
            doc.output_path(Path::new("/out")),
        );
        assert_eq!(
            PathBuf::from("/out/index.html"),
            route_to_path(Path::new("/out"), "/"),
        );
    }
}
