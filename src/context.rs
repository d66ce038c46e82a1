//! Defines [`RenderContext`], which turns [`Document`]s and listing pages into
//! template [`Value`]s. Every helper a template needs (navigation state,
//! teasers, date parts) is computed here from collaborators handed to the
//! context when it is constructed, so templates only ever see plain data.

use crate::collection::{post_day, post_month, Mode};
use crate::document::Document;
use crate::nav::Navigation;
use crate::summary::Summarizer;
use gtmpl::Value;
use std::collections::HashMap;
use url::Url;

/// Identifies the page being rendered for the purposes of navigation state.
#[derive(Clone, Copy, Debug)]
pub struct Location<'a> {
    /// The page's identifier (a document identifier, or a listing path such
    /// as `/` or `/page/2`).
    pub path: &'a str,

    /// The navigation section the page declares, if any.
    pub section: Option<&'a str>,
}

impl<'a> Location<'a> {
    /// The location of `document`'s own page.
    pub fn of(document: &'a Document) -> Location<'a> {
        Location {
            path: &document.identifier,
            section: document.section.as_deref(),
        }
    }

    /// The location of a listing page, which never declares a section.
    pub fn listing(path: &'a str) -> Location<'a> {
        Location {
            path,
            section: None,
        }
    }
}

/// Site-wide values exposed to every template as `.site`.
pub struct Site<'a> {
    pub title: &'a str,
    pub home_page: &'a Url,
    pub feed_url: &'a Url,
    pub static_url: &'a Url,
}

/// Produces template values.
pub struct RenderContext<'a> {
    pub navigation: &'a Navigation,
    pub summarizer: &'a Summarizer,
    pub mode: Mode,
    pub site: Site<'a>,
}

impl RenderContext<'_> {
    /// Builds the value for a whole page: `item` plus the `prev`/`next` URLs,
    /// the navigation links for `location`, the site values, and the mode.
    pub fn page_value(
        &self,
        location: Location,
        item: Value,
        prev: Option<&Url>,
        next: Option<&Url>,
    ) -> Value {
        let url_or_nil = |url: Option<&Url>| match url {
            Some(url) => Value::String(url.to_string()),
            None => Value::Nil,
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("item".to_owned(), item);
        m.insert("prev".to_owned(), url_or_nil(prev));
        m.insert("next".to_owned(), url_or_nil(next));
        m.insert("nav".to_owned(), self.nav_value(location));
        m.insert("site".to_owned(), self.site_value());
        m.insert(
            "production".to_owned(),
            Value::Bool(self.mode == Mode::Production),
        );
        Value::Object(m)
    }

    /// The navigation menu for `location`: a list of objects with `id`,
    /// `label`, `href`, `active`, and the rendered anchor as `html`.
    pub fn nav_value(&self, location: Location) -> Value {
        let active = self
            .navigation
            .resolve(location.path, location.section)
            .map(|item| item.id.as_str());
        Value::Array(
            self.navigation
                .items()
                .iter()
                .map(|item| {
                    let is_active = active == Some(item.id.as_str());
                    let mut m: HashMap<String, Value> = HashMap::new();
                    m.insert("id".to_owned(), Value::String(item.id.clone()));
                    m.insert("label".to_owned(), Value::String(item.label.clone()));
                    m.insert("href".to_owned(), Value::String(item.href.clone()));
                    m.insert("active".to_owned(), Value::Bool(is_active));
                    m.insert("html".to_owned(), Value::String(item.render(is_active)));
                    Value::Object(m)
                })
                .collect(),
        )
    }

    fn site_value(&self) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String(self.site.title.to_owned()));
        m.insert(
            "home_page".to_owned(),
            Value::String(self.site.home_page.to_string()),
        );
        m.insert(
            "feed_url".to_owned(),
            Value::String(self.site.feed_url.to_string()),
        );
        m.insert(
            "static_url".to_owned(),
            Value::String(self.site.static_url.to_string()),
        );
        Value::Object(m)
    }

    /// The value for a document's own page. The full body is exposed as
    /// `body`.
    pub fn document_value(&self, document: &Document) -> Value {
        let mut m = self.common_fields(document);
        m.insert("body".to_owned(), Value::String(document.body.clone()));
        Value::Object(m)
    }

    /// The value for a document in a listing. `body` holds the teaser (with
    /// its read-more link) and `summarized` reports whether the document was
    /// truncated.
    pub fn summary_value(&self, document: &Document) -> Value {
        let mut m = self.common_fields(document);
        m.insert(
            "body".to_owned(),
            Value::String(
                self.summarizer
                    .extract_teaser(&document.body, document.url.as_str())
                    .into_owned(),
            ),
        );
        m.insert(
            "summarized".to_owned(),
            Value::Bool(self.summarizer.has_summary(&document.body)),
        );
        Value::Object(m)
    }

    fn common_fields(&self, document: &Document) -> HashMap<String, Value> {
        let string_or_nil = |s: Option<String>| match s {
            Some(s) => Value::String(s),
            None => Value::Nil,
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String(document.title.clone()));
        m.insert("url".to_owned(), Value::String(document.url.to_string()));
        m.insert(
            "identifier".to_owned(),
            Value::String(document.identifier.clone()),
        );
        m.insert(
            "date".to_owned(),
            string_or_nil(
                document
                    .created_at
                    .map(|dt| dt.format("%Y-%m-%d").to_string()),
            ),
        );
        m.insert("day".to_owned(), string_or_nil(post_day(document)));
        m.insert("month".to_owned(), string_or_nil(post_month(document)));
        m.insert("published".to_owned(), Value::Bool(document.published));
        m.insert(
            "word_count".to_owned(),
            Value::String(document.word_count.to_string()),
        );
        m.insert(
            "tags".to_owned(),
            Value::Array(document.tags.iter().map(Value::from).collect()),
        );
        m
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::stub;

    fn field<'v>(value: &'v Value, key: &str) -> &'v Value {
        match value {
            Value::Object(m) => &m[key],
            _ => panic!("not an object"),
        }
    }

    fn string(value: &Value) -> &str {
        match value {
            Value::String(s) => s,
            _ => panic!("not a string"),
        }
    }

    fn with_context<F: FnOnce(&RenderContext)>(f: F) {
        let url = Url::parse("https://example.com/").unwrap();
        let navigation = Navigation::default();
        let summarizer = Summarizer::default();
        let context = RenderContext {
            navigation: &navigation,
            summarizer: &summarizer,
            mode: Mode::Development,
            site: Site {
                title: "Example",
                home_page: &url,
                feed_url: &url,
                static_url: &url,
            },
        };
        f(&context)
    }

    #[test]
    fn test_summary_value_truncates() {
        with_context(|context| {
            let mut doc = stub("/posts/hello", Some("2021-03-05T00:00:00Z"), true);
            doc.body = "<p>a</p>\n<!-- more -->\n<p>b</p>".to_owned();
            let value = context.summary_value(&doc);
            assert_eq!(
                "<p>a</p>\n<div class='read-more'><a href='https://example.com/hello'>Continue reading &rsaquo;</a></div>",
                string(field(&value, "body")),
            );
            assert!(matches!(field(&value, "summarized"), Value::Bool(true)));
            assert_eq!("MAR", string(field(&value, "month")));

            let full = context.document_value(&doc);
            assert_eq!(doc.body, string(field(&full, "body")));
        });
    }

    #[test]
    fn test_page_value_marks_active_nav() {
        with_context(|context| {
            let doc = stub("/posts/hello", None, true);
            let value = context.page_value(Location::of(&doc), Value::Nil, None, None);
            let active: Vec<&str> = match field(&value, "nav") {
                Value::Array(items) => items
                    .iter()
                    .filter(|item| matches!(field(item, "active"), Value::Bool(true)))
                    .map(|item| string(field(item, "id")))
                    .collect(),
                _ => panic!("nav is not an array"),
            };
            assert_eq!(vec!["blog"], active);
            assert!(matches!(field(&value, "prev"), Value::Nil));
        });
    }
}
