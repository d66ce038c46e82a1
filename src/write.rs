//! Lays out, templates, and writes the site's HTML pages. Every page is
//! written as `index.html` in the directory named by its route, so all URLs
//! end in `/`.

use crate::context::{Location, RenderContext};
use crate::document::{route_to_path, Document};
use crate::tag;
use gtmpl::{Template, Value};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// The parsed templates of a theme.
pub struct Templates {
    /// Applied to post pages.
    pub post: Template,

    /// Applied to the blog listing and to tag listings.
    pub index: Template,

    /// Applied to standalone pages and portfolio entries.
    pub page: Template,

    /// Applied to the portfolio listing (`/work/`).
    pub work: Template,
}

/// Responsible for laying out, templating, and writing HTML pages to disk.
pub struct Writer<'a> {
    /// The parsed theme templates.
    pub templates: &'a Templates,

    /// Converts documents into template values.
    pub context: &'a RenderContext<'a>,

    /// The base URL of the site; listing page URLs are joined onto it.
    pub site_root: &'a Url,

    /// The directory in which the HTML files will be written.
    pub output_directory: &'a Path,

    /// The number of posts per listing page.
    pub per_page: NonZeroUsize,
}

/// The documents to write, each already filtered and sorted.
pub struct Content<'d> {
    pub posts: &'d [&'d Document],
    pub pages: &'d [&'d Document],
    pub portfolios: &'d [&'d Document],
}

impl Writer<'_> {
    /// Lays out every page for `content` and writes them to disk. Returns the
    /// number of pages written.
    pub fn write_site(&self, content: &Content) -> Result<usize> {
        let mut pages = self.listing_pages(content.posts)?;
        pages.extend(self.document_pages(content.posts, &self.templates.post, true));
        pages.extend(self.document_pages(content.pages, &self.templates.page, false));
        pages.extend(self.document_pages(content.portfolios, &self.templates.page, true));
        pages.push(Page {
            identifier: "/work".to_owned(),
            section: None,
            route: "/work/".to_owned(),
            item: Value::Array(
                content
                    .portfolios
                    .iter()
                    .map(|d| self.context.summary_value(d))
                    .collect(),
            ),
            prev: None,
            next: None,
            template: &self.templates.work,
        });

        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let mut seen_routes: HashMap<&str, &str> = HashMap::new();
        for page in &pages {
            if let Some(other) = seen_routes.insert(&page.route, &page.identifier) {
                return Err(Error::RouteCollision {
                    route: page.route.clone(),
                    first: other.to_owned(),
                    second: page.identifier.clone(),
                });
            }
        }
        for page in &pages {
            let file_path = route_to_path(self.output_directory, &page.route);
            if let Some(dir) = file_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir)?;
                }
            }
            self.write_page(page, &file_path)?;
        }
        Ok(pages.len())
    }

    /// Takes a single [`Page`], templates it, and writes it to disk.
    fn write_page(&self, page: &Page, file_path: &Path) -> Result<()> {
        debug!(route = %page.route, file = %file_path.display(), "writing page");
        let value = self.context.page_value(
            Location {
                path: &page.identifier,
                section: page.section.as_deref(),
            },
            page.item.clone(),
            page.prev.as_ref(),
            page.next.as_ref(),
        );
        page.template.execute(
            &mut std::fs::File::create(file_path)?,
            &gtmpl::Context::from(value).map_err(Error::Template)?,
        )?;
        Ok(())
    }

    /// Creates a page for each document. If `linked`, each page links to its
    /// neighbors (`prev` is the newer neighbor, `next` the older); standalone
    /// pages have no meaningful order and get no links.
    fn document_pages<'t>(
        &self,
        documents: &[&Document],
        template: &'t Template,
        linked: bool,
    ) -> Vec<Page<'t>> {
        documents
            .iter()
            .enumerate()
            .map(|(i, document)| Page {
                identifier: document.identifier.clone(),
                section: document.section.clone(),
                route: document.route.clone(),
                item: self.context.document_value(document),
                prev: i
                    .checked_sub(1)
                    .filter(|_| linked)
                    .map(|j| documents[j].url.clone()),
                next: documents
                    .get(i + 1)
                    .filter(|_| linked)
                    .map(|d| d.url.clone()),
                template,
            })
            .collect()
    }

    /// Creates the paginated blog listing and one paginated listing per tag.
    fn listing_pages(&self, posts: &[&Document]) -> Result<Vec<Page<'_>>> {
        let mut pages = Listing {
            base: "/".to_owned(),
            tag: None,
            posts: posts.to_vec(),
        }
        .to_pages(self)?;

        for listing in index_by_tag(posts) {
            pages.extend(listing.to_pages(self)?);
        }
        Ok(pages)
    }

    fn url(&self, route: &str) -> Result<Url> {
        Ok(self.site_root.join(route.trim_start_matches('/'))?)
    }
}

/// An output HTML file before templating.
struct Page<'t> {
    /// The identifier navigation state is resolved against.
    identifier: String,

    /// The navigation section the page declares, if any.
    section: Option<String>,

    /// The page's site-relative route.
    route: String,

    /// The main item for the page.
    item: Value,

    /// The URL for the previous page, if any.
    prev: Option<Url>,

    /// The URL for the next page, if any.
    next: Option<Url>,

    /// The template with which the page will be rendered.
    template: &'t Template,
}

/// A collection of posts listed together: all posts (`base` is `/`) or the
/// posts of one tag (`base` is `/tags/{tag}/`).
struct Listing<'d> {
    base: String,
    tag: Option<String>,
    posts: Vec<&'d Document>,
}

impl Listing<'_> {
    /// The route of the 1-based `number`th page: `{base}` for the first page
    /// and `{base}page/{number}/` for the rest.
    fn route(&self, number: usize) -> String {
        match number {
            1 => self.base.clone(),
            _ => format!("{}page/{}/", self.base, number),
        }
    }

    /// Splits the listing into pages of `writer.per_page` posts. An empty
    /// listing still gets one (empty) page so that the home page exists.
    fn to_pages<'t>(&self, writer: &Writer<'t>) -> Result<Vec<Page<'t>>> {
        let chunks: Vec<&[&Document]> = match self.posts.is_empty() {
            true => vec![&self.posts[..]],
            false => self.posts.chunks(writer.per_page.get()).collect(),
        };
        let total_pages = chunks.len();

        chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| {
                let number = i + 1;
                let route = self.route(number);
                let mut item: HashMap<String, Value> = HashMap::new();
                item.insert(
                    "posts".to_owned(),
                    Value::Array(
                        chunk
                            .iter()
                            .map(|d| writer.context.summary_value(d))
                            .collect(),
                    ),
                );
                item.insert(
                    "tag".to_owned(),
                    match &self.tag {
                        Some(tag) => Value::String(tag.clone()),
                        None => Value::Nil,
                    },
                );
                item.insert("number".to_owned(), Value::String(number.to_string()));
                item.insert(
                    "total_pages".to_owned(),
                    Value::String(total_pages.to_string()),
                );
                item.insert(
                    "post_count".to_owned(),
                    Value::String(self.posts.len().to_string()),
                );

                Ok(Page {
                    identifier: route.trim_end_matches('/').to_owned(),
                    section: None,
                    prev: match number {
                        1 => None,
                        _ => Some(writer.url(&self.route(number - 1))?),
                    },
                    next: match number < total_pages {
                        false => None,
                        true => Some(writer.url(&self.route(number + 1))?),
                    },
                    route,
                    item: Value::Object(item),
                    template: &writer.templates.index,
                })
            })
            .collect()
    }
}

/// Groups `posts` by tag, preserving their order within each tag. Tags are
/// returned in order of first appearance.
fn index_by_tag<'d>(posts: &[&'d Document]) -> Vec<Listing<'d>> {
    let mut listings: Vec<Listing<'d>> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for &post in posts {
        for t in &post.tags {
            match positions.get(t.name.as_str()) {
                Some(&i) => listings[i].posts.push(post),
                None => {
                    positions.insert(&t.name, listings.len());
                    listings.push(Listing {
                        base: tag::route(&t.name),
                        tag: Some(t.name.clone()),
                        posts: vec![post],
                    });
                }
            }
        }
    }
    listings
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error during templating.
    #[error("templating: {0}")]
    Template(String),

    /// Returned when two pages would be written to the same route.
    #[error("`{first}` and `{second}` both route to `{route}`")]
    RouteCollision {
        route: String,
        first: String,
        second: String,
    },

    /// Returned when a listing URL can't be built.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    /// An error writing the output files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}
