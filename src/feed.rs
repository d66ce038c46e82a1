//! Support for creating Atom feeds from a list of posts.

use crate::config::Author;
use crate::document::Document;
use crate::summary::Summarizer;
use atom_syndication::{
    ContentBuilder, Entry, EntryBuilder, Error as AtomError, Feed, FeedBuilder, LinkBuilder,
    Person, PersonBuilder, Text,
};
use chrono::{DateTime, FixedOffset, Utc};
use std::io::Write;
use tracing::warn;
use url::Url;

/// Bundled configuration for creating a feed.
pub struct FeedConfig<'a> {
    pub title: &'a str,
    pub author: Option<&'a Author>,
    pub home_page: &'a Url,
    pub feed_url: &'a Url,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and a list of
/// posts (most recent first) and writes the result to a [`std::io::Write`].
/// Entry summaries are the bare teasers produced by `summarizer`; posts
/// without a separator are summarized by their whole body.
pub fn write_feed<W: Write>(
    config: &FeedConfig,
    summarizer: &Summarizer,
    posts: &[&Document],
    w: W,
) -> Result<()> {
    feed(config, summarizer, posts).write_to(w)?;
    Ok(())
}

fn feed(config: &FeedConfig, summarizer: &Summarizer, posts: &[&Document]) -> Feed {
    let entries = feed_entries(config, summarizer, posts);

    // the feed was last updated when its newest entry was
    let updated: DateTime<FixedOffset> = entries
        .iter()
        .map(|e| *e.updated())
        .max()
        .unwrap_or_else(|| Utc::now().into());

    FeedBuilder::default()
        .title(config.title)
        .id(config.home_page.as_str())
        .updated(updated)
        .authors(author_to_people(config.author))
        .links(vec![
            LinkBuilder::default()
                .href(config.home_page.as_str())
                .rel("alternate")
                .build(),
            LinkBuilder::default()
                .href(config.feed_url.as_str())
                .rel("self")
                .build(),
        ])
        .entries(entries)
        .build()
}

fn feed_entries(config: &FeedConfig, summarizer: &Summarizer, posts: &[&Document]) -> Vec<Entry> {
    let mut entries: Vec<Entry> = Vec::with_capacity(posts.len());

    for post in posts {
        let date = match post.created_at {
            Some(date) => date,
            None => {
                warn!(identifier = %post.identifier, "omitting undated post from the feed");
                continue;
            }
        };
        let summary = summarizer.split(&post.body).unwrap_or(&post.body);

        entries.push(
            EntryBuilder::default()
                .id(post.url.as_str())
                .title(post.title.as_str())
                .updated(date)
                .published(Some(date))
                .authors(author_to_people(config.author))
                .links(vec![LinkBuilder::default()
                    .href(post.url.as_str())
                    .rel("alternate")
                    .build()])
                .summary(Some(Text::html(summary)))
                .content(Some(
                    ContentBuilder::default()
                        .value(Some(post.body.clone()))
                        .content_type(Some("html".to_owned()))
                        .build(),
                ))
                .build(),
        );
    }
    entries
}

fn author_to_people(author: Option<&Author>) -> Vec<Person> {
    match author {
        Some(author) => vec![PersonBuilder::default()
            .name(author.name.as_str())
            .email(author.email.clone())
            .build()],
        None => Vec::new(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem writing a feed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when there is an Atom-related (including I/O) error.
    #[error(transparent)]
    Atom(#[from] AtomError),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::stub;

    #[test]
    fn test_write_feed() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let home_page = Url::parse("https://example.com/")?;
        let feed_url = home_page.join("feed.xml")?;
        let author = Author {
            name: "Ada".to_owned(),
            email: None,
        };
        let mut dated = stub("/posts/dated", Some("2021-03-05T00:00:00Z"), true);
        dated.title = "Dated & Done".to_owned();
        dated.body = "<p>intro</p><!-- more --><p>rest</p>".to_owned();
        let undated = stub("/posts/undated", None, true);

        let mut out: Vec<u8> = Vec::new();
        write_feed(
            &FeedConfig {
                title: "Example",
                author: Some(&author),
                home_page: &home_page,
                feed_url: &feed_url,
            },
            &Summarizer::default(),
            &[&dated, &undated],
            &mut out,
        )?;

        let xml = String::from_utf8(out)?;
        let parsed: Feed = xml.parse()?;
        assert_eq!(1, parsed.entries().len());
        let entry = &parsed.entries()[0];
        assert_eq!("Dated & Done", entry.title().value);
        assert_eq!(
            Some("<p>intro</p>"),
            entry.summary().map(|s| s.value.as_str()),
        );
        assert_eq!("2021-03-05T00:00:00+00:00", parsed.updated().to_rfc3339());
        Ok(())
    }
}
