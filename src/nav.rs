//! Decides which navigation menu entry a page belongs to and renders the menu
//! links accordingly.
//!
//! Each [`NavItem`] claims pages by exact path or by path prefix. Items are
//! consulted in their declared order and the first one to claim a page wins,
//! so at most one item is ever active. Pages no item claims can still name a
//! section explicitly (the `nav` frontmatter key); failing that, the
//! configured default section applies.

use pulldown_cmark::escape::{escape_href, escape_html};
use serde::Deserialize;

/// A single navigation menu entry.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct NavItem {
    /// The symbolic name of the entry (e.g., `blog` or `work`). Pages name
    /// their section with this value.
    pub id: String,

    /// The link text.
    pub label: String,

    /// The link target.
    pub href: String,

    /// Paths that belong to this entry only when matched exactly.
    #[serde(default)]
    pub exact: Vec<String>,

    /// Paths that belong to this entry along with everything beneath them.
    /// Matching respects path segments: `/about` claims `/about/me` but not
    /// `/aboutme`.
    #[serde(default)]
    pub prefixes: Vec<String>,
}

impl NavItem {
    /// Constructs a [`NavItem`] with no matching rules.
    pub fn new(id: &str, label: &str, href: &str) -> NavItem {
        NavItem {
            id: id.to_owned(),
            label: label.to_owned(),
            href: href.to_owned(),
            exact: Vec::new(),
            prefixes: Vec::new(),
        }
    }

    /// Adds exact-match paths.
    pub fn with_exact(mut self, paths: &[&str]) -> NavItem {
        self.exact.extend(paths.iter().map(|p| (*p).to_owned()));
        self
    }

    /// Adds prefix-match paths.
    pub fn with_prefixes(mut self, prefixes: &[&str]) -> NavItem {
        self.prefixes.extend(prefixes.iter().map(|p| (*p).to_owned()));
        self
    }

    fn claims(&self, path: &str) -> bool {
        self.exact.iter().any(|e| normalize(e) == path)
            || self.prefixes.iter().any(|p| has_prefix(path, normalize(p)))
    }

    /// Renders the entry as an anchor, with `class='active'` if `active`.
    pub fn render(&self, active: bool) -> String {
        let mut s = String::from("<a");
        if active {
            s.push_str(" class='active'");
        }
        s.push_str(" href='");
        // writing into a `String` can't fail
        let _ = escape_href(&mut s, &self.href);
        s.push_str("'>");
        let _ = escape_html(&mut s, &self.label);
        s.push_str("</a>");
        s
    }
}

/// The site's navigation menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    items: Vec<NavItem>,
    default_section: Option<String>,
}

impl Default for Navigation {
    /// The blog/work/about/contact menu. The blog entry claims the home page,
    /// the paginated listings, tag listings, and posts.
    fn default() -> Self {
        Navigation::new(
            vec![
                NavItem::new("blog", "Blog", "/")
                    .with_exact(&["/"])
                    .with_prefixes(&["/posts", "/page", "/tags"]),
                NavItem::new("work", "Work", "/work/")
                    .with_prefixes(&["/portfolio", "/work"]),
                NavItem::new("about", "About", "/about/").with_prefixes(&["/about"]),
                NavItem::new("contact", "Contact", "/contact/")
                    .with_prefixes(&["/contact"]),
            ],
            None,
        )
    }
}

impl Navigation {
    /// Constructs a [`Navigation`]. `default_section` is the item id used for
    /// pages that no rule claims and that don't name a section themselves.
    pub fn new(items: Vec<NavItem>, default_section: Option<String>) -> Navigation {
        Navigation {
            items,
            default_section,
        }
    }

    /// The menu entries in declared order.
    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    /// Returns the entry the page at `path` belongs to, if any. `section` is
    /// the page's explicitly declared section, consulted only when no entry
    /// claims the path.
    pub fn resolve(&self, path: &str, section: Option<&str>) -> Option<&NavItem> {
        let path = normalize(path);
        self.items.iter().find(|item| item.claims(path)).or_else(|| {
            let section = section.or(self.default_section.as_deref())?;
            self.items.iter().find(|item| item.id == section)
        })
    }

    /// Reports whether the page at `path` belongs to the entry named
    /// `target`. Unknown targets are simply never active.
    pub fn is_active(&self, path: &str, target: &str) -> bool {
        self.is_active_in(path, None, target)
    }

    /// Like [`Navigation::is_active`] but honoring a section declared by the
    /// page.
    pub fn is_active_in(&self, path: &str, section: Option<&str>, target: &str) -> bool {
        self.resolve(path, section)
            .map_or(false, |item| item.id == target)
    }

    /// Renders `item` as an anchor for the page at `path`.
    pub fn nav_link(&self, path: &str, section: Option<&str>, item: &NavItem) -> String {
        item.render(self.is_active_in(path, section, &item.id))
    }
}

// Strips trailing slashes so `/about/` and `/about` compare equal. The root
// stays `/`.
fn normalize(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

fn has_prefix(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
