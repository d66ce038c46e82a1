//! Loads a project's configuration from `folio.yaml` and its theme's
//! `theme/theme.yaml`.
//!
//! A minimal `folio.yaml` needs only a title and a site root:
//!
//! ```yaml
//! title: My Blog
//! site_root: https://example.com/
//! ```
//!
//! Everything else has a default: permalinks are `{year}/{month}/{slug}`,
//! listings show 10 posts per page, teasers are cut at `<!-- more -->`, and
//! the navigation menu is blog/work/about/contact.

use crate::nav::{NavItem, Navigation};
use crate::permalink::{self, Permalink};
use crate::summary::{self, Separator, Summarizer, DEFAULT_READ_MORE};
use serde::Deserialize;
use std::fs::File;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file.
pub const PROJECT_FILE: &str = "folio.yaml";

#[derive(Deserialize)]
struct PerPage(usize);
impl Default for PerPage {
    fn default() -> Self {
        PerPage(10)
    }
}

/// The author of the site, credited in the feed.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Project {
    title: String,
    site_root: Url,

    #[serde(default)]
    author: Option<Author>,

    #[serde(default)]
    permalink: Option<String>,

    #[serde(default)]
    per_page: PerPage,

    #[serde(default)]
    summary: SummarySettings,

    #[serde(default)]
    navigation: Option<NavigationSettings>,
}

#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SummarySettings {
    /// A literal separator.
    #[serde(default)]
    separator: Option<String>,

    /// A regular expression separator.
    #[serde(default)]
    pattern: Option<String>,

    #[serde(default)]
    read_more: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NavigationSettings {
    items: Vec<NavItem>,

    #[serde(default)]
    default: Option<String>,
}

#[derive(Deserialize)]
struct Theme {
    post: Vec<PathBuf>,
    index: Vec<PathBuf>,
    page: Vec<PathBuf>,
    work: Vec<PathBuf>,
}

/// The fully-resolved project configuration.
pub struct Config {
    /// The site's title.
    pub title: String,

    /// The site's base URL, always ending in `/`.
    pub site_root: Url,

    /// The author credited in the feed, if any.
    pub author: Option<Author>,

    /// The pattern for post routes.
    pub permalink: Permalink,

    /// The number of posts per listing page.
    pub per_page: NonZeroUsize,

    /// Derives teasers from post bodies.
    pub summarizer: Summarizer,

    /// The navigation menu.
    pub navigation: Navigation,

    /// The directory containing `folio.yaml`; sources are found beneath it.
    pub project_directory: PathBuf,

    /// The directory whose contents are copied verbatim to
    /// `{output}/static/`.
    pub static_source_directory: PathBuf,

    /// The template files for post pages, concatenated in order.
    pub post_template: Vec<PathBuf>,

    /// The template files for listing pages.
    pub index_template: Vec<PathBuf>,

    /// The template files for standalone pages and portfolio entries.
    pub page_template: Vec<PathBuf>,

    /// The template files for the portfolio listing.
    pub work_template: Vec<PathBuf>,
}

impl Config {
    /// Searches `dir` and its ancestors for `folio.yaml` and loads the first
    /// one found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        for ancestor in dir.ancestors() {
            let path = ancestor.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path);
            }
        }
        Err(Error::NotFound(dir.to_owned()))
    }

    /// Loads the configuration from the project file at `path` and from the
    /// theme beside it.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path)?).map_err(|err| {
            Error::DeserializeYaml {
                path: path.to_owned(),
                err,
            }
        })?;
        let project_directory = match path.parent() {
            Some(dir) => dir.to_owned(),
            None => return Err(Error::NotFound(path.to_owned())),
        };

        let theme_directory = project_directory.join("theme");
        let theme_path = theme_directory.join("theme.yaml");
        let theme: Theme = serde_yaml::from_reader(open(&theme_path)?).map_err(|err| {
            Error::DeserializeYaml {
                path: theme_path.clone(),
                err,
            }
        })?;
        let in_theme = |paths: Vec<PathBuf>| -> Vec<PathBuf> {
            paths.iter().map(|p| theme_directory.join(p)).collect()
        };

        let per_page = NonZeroUsize::new(project.per_page.0).ok_or(Error::InvalidPageSize)?;

        Ok(Config {
            title: project.title,
            site_root: with_trailing_slash(project.site_root),
            author: project.author,
            permalink: match &project.permalink {
                Some(pattern) => pattern.parse()?,
                None => Permalink::default(),
            },
            per_page,
            summarizer: project.summary.into_summarizer()?,
            navigation: match project.navigation {
                Some(settings) => Navigation::new(settings.items, settings.default),
                None => Navigation::default(),
            },
            static_source_directory: project_directory.join("static"),
            post_template: in_theme(theme.post),
            index_template: in_theme(theme.index),
            page_template: in_theme(theme.page),
            work_template: in_theme(theme.work),
            project_directory,
        })
    }
}

impl SummarySettings {
    fn into_summarizer(self) -> Result<Summarizer> {
        let separator = match (self.separator, self.pattern) {
            (Some(_), Some(_)) => return Err(Error::ConflictingSeparators),
            (Some(literal), None) => Separator::literal(literal)?,
            (None, Some(pattern)) => Separator::pattern(&pattern)?,
            (None, None) => Separator::default(),
        };
        Ok(Summarizer::new(
            separator,
            self.read_more.as_deref().unwrap_or(DEFAULT_READ_MORE),
        )?)
    }
}

// `Url::join` treats the last path segment of a base without a trailing
// slash as a file name and drops it, so `https://example.com/blog` would
// lose `blog`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|err| Error::Open {
        path: path.to_owned(),
        err,
    })
}

/// The result of loading a [`Config`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when no `folio.yaml` exists in the directory or its
    /// ancestors.
    #[error("could not find `folio.yaml` in `{}` or any parent directory", .0.display())]
    NotFound(PathBuf),

    /// Returned when a configuration file can't be opened.
    #[error("opening `{}`: {err}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when a configuration file isn't valid.
    #[error("parsing `{}`: {err}", .path.display())]
    DeserializeYaml {
        path: PathBuf,
        #[source]
        err: serde_yaml::Error,
    },

    /// Returned when `per_page` is zero.
    #[error("`per_page` must be at least 1")]
    InvalidPageSize,

    /// Returned when both `summary.separator` and `summary.pattern` are set.
    #[error("`summary.separator` and `summary.pattern` are mutually exclusive")]
    ConflictingSeparators,

    /// Returned for an invalid summary separator.
    #[error(transparent)]
    Summary(#[from] summary::Error),

    /// Returned for an invalid permalink pattern.
    #[error(transparent)]
    Permalink(#[from] permalink::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const THEME: &str = "post: [base.html, post.html]\nindex: [index.html]\npage: [page.html]\nwork: [work.html]\n";

    fn project(folio_yaml: &str) -> std::io::Result<tempfile::TempDir> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir_all(dir.path().join("theme"))?;
        std::fs::write(dir.path().join(PROJECT_FILE), folio_yaml)?;
        std::fs::write(dir.path().join("theme/theme.yaml"), THEME)?;
        Ok(dir)
    }

    #[test]
    fn test_defaults() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = project("title: Example\nsite_root: https://example.com/blog\n")?;
        let config = Config::from_project_file(&dir.path().join(PROJECT_FILE))?;

        assert_eq!("https://example.com/blog/", config.site_root.as_str());
        assert_eq!(10, config.per_page.get());
        assert_eq!(Permalink::default(), config.permalink);
        assert_eq!(Navigation::default(), config.navigation);
        assert_eq!(None, config.author);
        assert!(config.summarizer.has_summary("a<!-- more -->b"));
        assert_eq!(
            vec![dir.path().join("theme/base.html"), dir.path().join("theme/post.html")],
            config.post_template,
        );
        Ok(())
    }

    #[test]
    fn test_from_directory_searches_ancestors() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = project("title: Example\nsite_root: https://example.com/\n")?;
        let nested = dir.path().join("posts/2021");
        std::fs::create_dir_all(&nested)?;
        let config = Config::from_directory(&nested)?;
        assert_eq!(dir.path(), config.project_directory);
        Ok(())
    }

    #[test]
    fn test_custom_settings() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = project(
            r#"title: Example
site_root: https://example.com/
author:
  name: Ada
  email: ada@example.com
permalink: "articles/{slug}"
per_page: 3
summary:
  pattern: '\s<!-- more -->\s'
  read_more: Keep going
navigation:
  default: notes
  items:
    - id: notes
      label: Notes
      href: /
      prefixes: [/posts]
"#,
        )?;
        let config = Config::from_project_file(&dir.path().join(PROJECT_FILE))?;

        assert_eq!(3, config.per_page.get());
        assert_eq!("/articles/x/", config.permalink.expand("x", "X", None));
        assert_eq!(Some("ada@example.com"), config.author.as_ref().and_then(|a| a.email.as_deref()));
        assert!(!config.summarizer.has_summary("a<!-- more -->b"));
        assert!(config.navigation.is_active("/anything", "notes"));
        assert_eq!(
            "x<div class='read-more'><a href='/x/'>Keep going &rsaquo;</a></div>",
            config.summarizer.extract_teaser("x <!-- more --> y", "/x/"),
        );
        Ok(())
    }

    #[test]
    fn test_invalid_settings() -> std::io::Result<()> {
        let conflicting = project(
            "title: x\nsite_root: https://example.com/\nsummary:\n  separator: a\n  pattern: b\n",
        )?;
        assert!(matches!(
            Config::from_project_file(&conflicting.path().join(PROJECT_FILE)),
            Err(Error::ConflictingSeparators)
        ));

        let greedy = project(
            "title: x\nsite_root: https://example.com/\nsummary:\n  separator: read-more\n",
        )?;
        assert!(matches!(
            Config::from_project_file(&greedy.path().join(PROJECT_FILE)),
            Err(Error::Summary(summary::Error::MatchesReadMore(_)))
        ));

        let zero = project("title: x\nsite_root: https://example.com/\nper_page: 0\n")?;
        assert!(matches!(
            Config::from_project_file(&zero.path().join(PROJECT_FILE)),
            Err(Error::InvalidPageSize)
        ));

        let bad_permalink = project("title: x\nsite_root: https://example.com/\npermalink: \"{nope}\"\n")?;
        assert!(matches!(
            Config::from_project_file(&bad_permalink.path().join(PROJECT_FILE)),
            Err(Error::Permalink(_))
        ));

        let missing = tempfile::tempdir()?;
        assert!(matches!(
            Config::from_directory(missing.path()),
            Err(Error::NotFound(_))
        ));
        Ok(())
    }
}
