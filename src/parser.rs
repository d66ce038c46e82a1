//! Defines the [`Parser`] and [`Error`] types, which turn the source files of
//! a project into [`Document`]s.
//!
//! A project keeps its sources in three directories beneath its root:
//! `posts/` (searched recursively, e.g. `posts/2021/hello.md`), `pages/`, and
//! `portfolio/`. Missing directories are skipped.

use crate::document::{Document, Kind};
use crate::markdown;
use crate::permalink::Permalink;
use crate::tag::{self, Tag};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use url::Url;
use walkdir::WalkDir;

const MARKDOWN_EXTENSION: &str = "md";

/// Parses [`Document`] objects from source files.
pub struct Parser<'a> {
    /// `site_root` is the base URL of the site. Document and tag URLs are
    /// joined onto it.
    site_root: &'a Url,

    /// `permalink` determines the routes of posts.
    permalink: &'a Permalink,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(site_root: &'a Url, permalink: &'a Permalink) -> Parser<'a> {
        Parser {
            site_root,
            permalink,
        }
    }

    /// Parses every document beneath `project_directory`. Documents are
    /// returned in source order (posts, then pages, then portfolio entries,
    /// each sorted by path); see [`crate::collection`] for date ordering.
    pub fn parse_documents(&self, project_directory: &Path) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        for kind in [Kind::Post, Kind::Page, Kind::Portfolio] {
            let dir = project_directory.join(kind.source_directory());
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "source directory missing; skipping");
                continue;
            }

            // only posts are organized into subdirectories
            let max_depth = match kind {
                Kind::Post => usize::MAX,
                Kind::Page | Kind::Portfolio => 1,
            };
            for result in WalkDir::new(&dir).max_depth(max_depth).sort_by_file_name() {
                let entry = result?;
                let path = entry.path();
                if entry.file_type().is_file()
                    && path.extension().map_or(false, |e| e == MARKDOWN_EXTENSION)
                {
                    // strip_prefix() should never fail; `dir` is beneath
                    // `project_directory`
                    let relative_path = path
                        .strip_prefix(project_directory)
                        .map_err(|_| Error::InvalidFileName(path.to_owned()))?;
                    documents.push(self.parse_document(project_directory, relative_path, kind)?);
                }
            }
        }
        Ok(documents)
    }

    /// Parses a single [`Document`], annotating any error with the path.
    fn parse_document(
        &self,
        project_directory: &Path,
        relative_path: &Path,
        kind: Kind,
    ) -> Result<Document> {
        debug!(path = %relative_path.display(), "parsing document");
        match self._parse_document(project_directory, relative_path, kind) {
            Ok(doc) => Ok(doc),
            Err(e) => Err(Error::Annotated {
                path: relative_path.to_owned(),
                err: Box::new(e),
            }),
        }
    }

    fn _parse_document(
        &self,
        project_directory: &Path,
        relative_path: &Path,
        kind: Kind,
    ) -> Result<Document> {
        use std::io::Read;
        let mut contents = String::new();
        File::open(project_directory.join(relative_path))?.read_to_string(&mut contents)?;
        self.parse_str(relative_path, kind, &contents)
    }

    /// Parses a [`Document`] from `input`, which must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with `title` and optionally `created_at`,
    ///    `published`, `tags`, and `nav`
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Markdown body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// created_at: 2021-04-16
    /// published: true
    /// tags: [greet]
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    pub fn parse_str(&self, relative_path: &Path, kind: Kind, input: &str) -> Result<Document> {
        fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
            const FENCE: &str = "---";
            if !input.starts_with(FENCE) {
                return Err(Error::FrontmatterMissingStartFence);
            }
            match input[FENCE.len()..].find(FENCE) {
                None => Err(Error::FrontmatterMissingEndFence),
                Some(offset) => Ok((
                    FENCE.len(),                        // yaml_start
                    FENCE.len() + offset,               // yaml_stop
                    FENCE.len() + offset + FENCE.len(), // body_start
                )),
            }
        }

        let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

        let identifier = identifier(relative_path, kind)?;
        let stem = relative_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidFileName(relative_path.to_owned()))?;
        let slug = slug::slugify(stem);
        let created_at = frontmatter
            .created_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;

        let route = match kind {
            Kind::Post => {
                if created_at.is_none() && self.permalink.uses_date() {
                    warn!(%identifier, "post has no `created_at`; routing by slug alone");
                }
                self.permalink
                    .expand(&slug, &frontmatter.title, created_at.as_ref())
            }
            Kind::Page => format!("/{}/", slug),
            Kind::Portfolio => format!("/portfolio/{}/", slug),
        };

        let mut tags: Vec<Tag> = Vec::with_capacity(frontmatter.tags.len());
        for name in &frontmatter.tags {
            let name = slug::slugify(name);
            let url = self.site_root.join(tag::route(&name).trim_start_matches('/'))?;
            let tag = Tag { name, url };
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        let rendered = markdown::to_html(&input[body_start..]);
        Ok(Document {
            kind,
            url: self.site_root.join(route.trim_start_matches('/'))?,
            identifier,
            slug,
            title: frontmatter.title,
            created_at,
            published: frontmatter.published,
            tags,
            section: frontmatter.nav,
            route,
            body: rendered.html,
            word_count: rendered.word_count,
        })
    }
}

#[derive(Deserialize)]
struct Frontmatter {
    /// The title of the document.
    title: String,

    /// When the document was written.
    #[serde(default)]
    created_at: Option<String>,

    /// Whether the document shows up in production builds.
    #[serde(default)]
    published: bool,

    /// The tags associated with the document.
    #[serde(default)]
    tags: Vec<String>,

    /// The navigation section the document belongs to, for documents no
    /// navigation rule claims.
    #[serde(default)]
    nav: Option<String>,
}

// `posts/2021/hello.md` -> `/posts/2021/hello`, `pages/about.md` -> `/about`
fn identifier(relative_path: &Path, kind: Kind) -> Result<String> {
    let source_path = match kind {
        Kind::Page => relative_path
            .strip_prefix(kind.source_directory())
            .unwrap_or(relative_path),
        Kind::Post | Kind::Portfolio => relative_path,
    };
    let mut identifier = String::new();
    for component in source_path.with_extension("").components() {
        match component {
            Component::Normal(c) => {
                identifier.push('/');
                identifier.push_str(
                    c.to_str()
                        .ok_or_else(|| Error::InvalidFileName(relative_path.to_owned()))?,
                );
            }
            _ => return Err(Error::InvalidFileName(relative_path.to_owned())),
        }
    }
    Ok(identifier)
}

/// Parses a `created_at` value. Accepts RFC 3339 (`2021-03-05T10:00:00+01:00`),
/// `2021-03-05 10:00:00`, and bare dates (`2021-03-05`); the latter two are
/// taken to be UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    let naive = match NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        Ok(naive) => naive,
        Err(_) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| Error::InvalidTimestamp(s.to_owned()))?,
    };
    Ok(Utc.from_utc_datetime(&naive).into())
}

/// Represents the result of a [`Document`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Document`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a source file is missing its starting frontmatter fence
    /// (`---`).
    #[error("document must begin with `---`")]
    FrontmatterMissingStartFence,

    /// Returned when a source file is missing its terminal frontmatter fence
    /// (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    #[error("missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when `created_at` isn't in one of the accepted formats.
    #[error("invalid `created_at` timestamp `{0}`")]
    InvalidTimestamp(String),

    /// Returned when there was an error parsing the frontmatter as YAML.
    #[error(transparent)]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned when there is a problem joining URLs.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned for WalkDir I/O errors.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Returned when a source path isn't valid UTF-8.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),

    /// An error with the path of the file that caused it.
    #[error("parsing `{}`: {err}", .path.display())]
    Annotated {
        path: PathBuf,
        #[source]
        err: Box<Error>,
    },
}
