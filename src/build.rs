//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing the documents
//! ([`crate::parser`]), selecting what the build mode shows
//! ([`crate::collection`]), rendering pages ([`crate::write`]), copying the
//! static source directory into the output directory, and generating the
//! Atom feed ([`crate::feed`]).

use crate::collection::{self, Mode};
use crate::config::Config;
use crate::context::{RenderContext, Site};
use crate::document::Kind;
use crate::feed::{write_feed, Error as FeedError, FeedConfig};
use crate::parser::{Error as ParseError, Parser};
use crate::write::{Content, Error as WriteError, Templates, Writer};
use gtmpl::Template;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The marker file that identifies a directory as `folio` output. Only
/// directories carrying it (or empty ones) are cleaned before a build.
pub const WATERMARK: &str = ".folio";

/// Counts of what a build produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// The number of posts visible in the build mode.
    pub posts: usize,

    /// The number of HTML pages written.
    pub pages: usize,
}

/// Builds the site described by `config` into `output_directory`. This calls
/// into [`Parser::parse_documents`], [`Writer::write_site`], and
/// [`write_feed`] which do the heavy-lifting. `mode` decides which posts are
/// visible.
pub fn build_site(config: &Config, mode: Mode, output_directory: &Path) -> Result<Report> {
    info!(project = %config.project_directory.display(), %mode, "building site");

    // collect all documents
    let parser = Parser::new(&config.site_root, &config.permalink);
    let documents = parser.parse_documents(&config.project_directory)?;
    debug!(count = documents.len(), "parsed documents");

    let posts = collection::blog_articles(&documents, mode);
    let pages = collection::pages(&documents);
    let portfolios = collection::portfolios(&documents);
    info!(
        posts = posts.len(),
        hidden = documents.iter().filter(|d| d.kind == Kind::Post).count() - posts.len(),
        pages = pages.len(),
        portfolios = portfolios.len(),
        "selected documents"
    );

    // Parse the template files.
    let templates = Templates {
        post: parse_template(config.post_template.iter())?,
        index: parse_template(config.index_template.iter())?,
        page: parse_template(config.page_template.iter())?,
        work: parse_template(config.work_template.iter())?,
    };

    clean(output_directory)?;

    let home_page = config.site_root.clone();
    let feed_url = config.site_root.join("feed.xml")?;
    let static_url = config.site_root.join("static/")?;
    let context = RenderContext {
        navigation: &config.navigation,
        summarizer: &config.summarizer,
        mode,
        site: Site {
            title: &config.title,
            home_page: &home_page,
            feed_url: &feed_url,
            static_url: &static_url,
        },
    };

    // write the pages
    let writer = Writer {
        templates: &templates,
        context: &context,
        site_root: &config.site_root,
        output_directory,
        per_page: config.per_page,
    };
    let written = writer.write_site(&Content {
        posts: &posts,
        pages: &pages,
        portfolios: &portfolios,
    })?;

    // copy static directory
    if config.static_source_directory.is_dir() {
        copy_dir(
            &config.static_source_directory,
            &output_directory.join("static"),
        )?;
    }

    // create the atom feed
    write_feed(
        &FeedConfig {
            title: &config.title,
            author: config.author.as_ref(),
            home_page: &home_page,
            feed_url: &feed_url,
        },
        &config.summarizer,
        &posts,
        File::create(output_directory.join("feed.xml"))?,
    )?;

    info!(pages = written, output = %output_directory.display(), "site built");
    Ok(Report {
        posts: posts.len(),
        pages: written,
    })
}

// Empties `dir` so that pages from a previous build don't linger, creating it
// if necessary. Refuses to touch a non-empty directory that wasn't created by
// a previous build, in case the wrong directory was passed.
fn clean(dir: &Path) -> Result<()> {
    let clean_err = |err| Error::Clean {
        path: dir.to_owned(),
        err,
    };
    if dir.exists() {
        let empty = std::fs::read_dir(dir).map_err(clean_err)?.next().is_none();
        if !empty && !dir.join(WATERMARK).is_file() {
            return Err(Error::NotOutputDirectory(dir.to_owned()));
        }
        std::fs::remove_dir_all(dir).map_err(clean_err)?;
    }
    std::fs::create_dir_all(dir).map_err(clean_err)?;
    std::fs::write(dir.join(WATERMARK), "").map_err(clean_err)?;
    Ok(())
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dst.join(entry.file_name()))?;
        } else {
            std::fs::copy(entry.path(), dst.join(entry.file_name()))?;
        }
    }

    Ok(())
}

// Loads the template file contents, concatenates them, and parses the result
// into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(template_file)
            .and_then(|mut f| f.read_to_string(&mut contents))
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing, writing,
/// cleaning the output directory, parsing template files, and other I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for errors during parsing.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Returned for errors writing pages to disk.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Returned for I/O problems while cleaning the output directory.
    #[error("cleaning directory `{}`: {err}", .path.display())]
    Clean {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when the output directory has content but no watermark.
    #[error(
        "refusing to clean `{}`: it is not empty and was not created by folio",
        .0.display()
    )]
    NotOutputDirectory(PathBuf),

    /// Returned for I/O problems while opening template files.
    #[error("opening template file `{}`: {err}", .path.display())]
    OpenTemplateFile {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned for errors parsing template files.
    #[error("parsing templates: {0}")]
    ParseTemplate(String),

    /// Returned for errors writing the feed.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// Returned when the feed or static URLs can't be built.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
