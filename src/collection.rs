//! Ordering and visibility rules for collections of [`Document`]s, plus the
//! date helpers listing templates use.

use crate::document::{Document, Kind};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use tracing::warn;

/// The build mode. Production builds show published documents only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    /// Every document is shown, published or not.
    #[default]
    Development,

    /// Only documents flagged `published: true` are shown.
    Production,
}

impl Mode {
    /// Reports whether `document` is visible in this mode.
    pub fn shows(self, document: &Document) -> bool {
        match self {
            Mode::Production => document.published,
            Mode::Development => true,
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Mode::Production),
            "development" => Ok(Mode::Development),
            _ => Err(UnknownModeError(s.to_owned())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mode::Production => write!(f, "production"),
            Mode::Development => write!(f, "development"),
        }
    }
}

/// Returned when parsing a [`Mode`] from anything other than `production` or
/// `development`.
#[derive(Debug, thiserror::Error)]
#[error("unknown mode `{0}` (expected `production` or `development`)")]
pub struct UnknownModeError(String);

/// Sorts `documents` by `created_at`, most recent first. The sort is stable,
/// and undated documents go last; each undated document is reported with a
/// warning since it can't be placed meaningfully.
pub fn sort_newest_first<D: Borrow<Document>>(documents: &mut [D]) {
    for document in documents.iter() {
        let document: &Document = document.borrow();
        if document.created_at.is_none() {
            warn!(
                identifier = %document.identifier,
                "document has no `created_at`; sorting it last"
            );
        }
    }
    documents.sort_by(|a, b| newest_first(a.borrow(), b.borrow()));
}

fn newest_first(a: &Document, b: &Document) -> Ordering {
    match (&a.created_at, &b.created_at) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Returns the documents of `kind` visible in `mode`, most recent first.
pub fn select(documents: &[Document], kind: Kind, mode: Mode) -> Vec<&Document> {
    let mut selected: Vec<&Document> = documents
        .iter()
        .filter(|d| d.kind == kind && mode.shows(d))
        .collect();
    sort_newest_first(&mut selected);
    selected
}

/// Returns the blog posts visible in `mode`, most recent first.
pub fn blog_articles(documents: &[Document], mode: Mode) -> Vec<&Document> {
    select(documents, Kind::Post, mode)
}

/// Returns the portfolio entries, most recent first. Portfolio entries are
/// not subject to the publishing filter.
pub fn portfolios(documents: &[Document]) -> Vec<&Document> {
    select(documents, Kind::Portfolio, Mode::Development)
}

/// Returns the standalone pages in source order. Pages are never
/// publish-filtered and are usually undated, so they aren't date-sorted.
pub fn pages(documents: &[Document]) -> Vec<&Document> {
    documents.iter().filter(|d| d.kind == Kind::Page).collect()
}

/// The space-padded day of the month on which `document` was created (e.g.,
/// ` 5`).
pub fn post_day(document: &Document) -> Option<String> {
    document
        .created_at
        .map(|dt| dt.format("%e").to_string())
}

/// The upper-cased abbreviated month in which `document` was created (e.g.,
/// `MAR`).
pub fn post_month(document: &Document) -> Option<String> {
    document
        .created_at
        .map(|dt| dt.format("%b").to_string().to_uppercase())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::stub;
    use pretty_assertions::assert_eq;

    fn identifiers(docs: &[&Document]) -> Vec<String> {
        docs.iter().map(|d| d.identifier.clone()).collect()
    }

    #[test]
    fn test_pages_keep_source_order() {
        let mut contact = stub("/contact", Some("2021-01-01T00:00:00Z"), false);
        contact.kind = Kind::Page;
        let mut about = stub("/about", None, false);
        about.kind = Kind::Page;
        let post = stub("/posts/a", Some("2021-02-01T00:00:00Z"), true);
        let docs = vec![about, post, contact];
        assert_eq!(vec!["/about", "/contact"], identifiers(&pages(&docs)));
    }

    #[test]
    fn test_production_shows_only_published() {
        let docs = vec![stub("/posts/a", None, true), stub("/posts/b", None, false)];
        assert_eq!(vec!["/posts/a"], identifiers(&blog_articles(&docs, Mode::Production)));
        assert_eq!(
            vec!["/posts/a", "/posts/b"],
            identifiers(&blog_articles(&docs, Mode::Development)),
        );
    }

    #[test]
    fn test_sort_newest_first() {
        let mut docs = vec![
            stub("/posts/2020", Some("2020-01-01T00:00:00Z"), true),
            stub("/posts/2022", Some("2022-01-01T00:00:00Z"), true),
            stub("/posts/2021", Some("2021-01-01T00:00:00Z"), true),
        ];
        sort_newest_first(&mut docs);
        assert_eq!(
            vec!["/posts/2022", "/posts/2021", "/posts/2020"],
            docs.iter().map(|d| d.identifier.as_str()).collect::<Vec<_>>(),
        );
    }

    #[test]
    fn test_undated_sort_last_and_stable() {
        let docs = vec![
            stub("/posts/undated-1", None, true),
            stub("/posts/dated", Some("2021-01-01T00:00:00Z"), true),
            stub("/posts/undated-2", None, true),
        ];
        assert_eq!(
            vec!["/posts/dated", "/posts/undated-1", "/posts/undated-2"],
            identifiers(&blog_articles(&docs, Mode::Development)),
        );
    }

    #[test]
    fn test_portfolios_ignore_mode() {
        let mut work = stub("/portfolio/lamp", Some("2019-05-01T00:00:00Z"), false);
        work.kind = Kind::Portfolio;
        let docs = vec![work, stub("/posts/a", None, true)];
        assert_eq!(vec!["/portfolio/lamp"], identifiers(&portfolios(&docs)));
    }

    #[test]
    fn test_post_day_and_month() {
        let doc = stub("/posts/a", Some("2021-03-05T10:00:00Z"), true);
        assert_eq!(Some(" 5".to_owned()), post_day(&doc));
        assert_eq!(Some("MAR".to_owned()), post_month(&doc));
        assert_eq!(None, post_day(&stub("/posts/b", None, true)));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(Mode::Production, "production".parse::<Mode>().unwrap());
        assert_eq!(Mode::Development, "development".parse::<Mode>().unwrap());
        assert!("staging".parse::<Mode>().is_err());
    }
}
