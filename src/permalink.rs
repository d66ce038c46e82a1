//! Expands permalink patterns such as `{year}/{month}/{slug}` into post
//! routes.

use chrono::{DateTime, Datelike, FixedOffset};

/// The pattern used when the configuration doesn't name one.
pub const DEFAULT_PATTERN: &str = "{year}/{month}/{slug}";

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Text(String),
    Year,
    Month,
    Day,
    Slug,
    Title,
}

/// A parsed permalink pattern. Recognized tokens are `{year}`, `{month}`,
/// `{day}` (both zero-padded), `{slug}` (the slugified file name), and
/// `{title}` (the slugified title).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permalink {
    segments: Vec<Segment>,
}

impl Default for Permalink {
    fn default() -> Self {
        // the default pattern is known to be valid
        Permalink {
            segments: vec![
                Segment::Year,
                Segment::Text("/".to_owned()),
                Segment::Month,
                Segment::Text("/".to_owned()),
                Segment::Slug,
            ],
        }
    }
}

impl std::str::FromStr for Permalink {
    type Err = Error;

    fn from_str(pattern: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = pattern;
        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Text(rest[..open].to_owned()));
            }
            let close = rest[open..]
                .find('}')
                .ok_or_else(|| Error::Unterminated(pattern.to_owned()))?
                + open;
            segments.push(match &rest[open + 1..close] {
                "year" => Segment::Year,
                "month" => Segment::Month,
                "day" => Segment::Day,
                "slug" => Segment::Slug,
                "title" => Segment::Title,
                token => return Err(Error::UnknownToken(token.to_owned())),
            });
            rest = &rest[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_owned()));
        }

        if !segments
            .iter()
            .any(|s| matches!(s, Segment::Slug | Segment::Title))
        {
            return Err(Error::MissingName(pattern.to_owned()));
        }
        Ok(Permalink { segments })
    }
}

impl Permalink {
    /// Reports whether the pattern needs a date to expand.
    pub fn uses_date(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Year | Segment::Month | Segment::Day))
    }

    /// Expands the pattern into a route beginning and ending with `/`. If the
    /// pattern needs a date and `date` is `None`, the route falls back to
    /// `/{slug}/`.
    pub fn expand(&self, slug: &str, title: &str, date: Option<&DateTime<FixedOffset>>) -> String {
        let date = match (self.uses_date(), date) {
            (true, None) => return format!("/{}/", slug),
            (_, date) => date,
        };

        let mut route = String::from("/");
        for segment in &self.segments {
            match (segment, date) {
                (Segment::Text(text), _) => route.push_str(text),
                (Segment::Slug, _) => route.push_str(slug),
                (Segment::Title, _) => route.push_str(&slug::slugify(title)),
                (Segment::Year, Some(d)) => route.push_str(&format!("{:04}", d.year())),
                (Segment::Month, Some(d)) => route.push_str(&format!("{:02}", d.month())),
                (Segment::Day, Some(d)) => route.push_str(&format!("{:02}", d.day())),
                // unreachable: date tokens imply a date per the check above
                (_, None) => {}
            }
        }
        if !route.ends_with('/') {
            route.push('/');
        }

        // collapse the doubled slashes a leading or trailing `/` in the
        // pattern would otherwise leave behind
        while let Some(i) = route.find("//") {
            route.remove(i);
        }
        route
    }
}

/// The result of parsing a [`Permalink`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an invalid permalink pattern.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a `{` has no matching `}`.
    #[error("unterminated token in permalink pattern `{0}`")]
    Unterminated(String),

    /// Returned for tokens other than `year`, `month`, `day`, `slug`, and
    /// `title`.
    #[error("unknown permalink token `{{{0}}}`")]
    UnknownToken(String),

    /// Returned when the pattern contains neither `{slug}` nor `{title}`, in
    /// which case every post would land on the same route.
    #[error("permalink pattern `{0}` must contain `{{slug}}` or `{{title}}`")]
    MissingName(String),
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_default_pattern() -> Result<()> {
        let permalink: Permalink = DEFAULT_PATTERN.parse()?;
        assert_eq!(Permalink::default(), permalink);
        assert_eq!(
            "/2021/03/hello/",
            permalink.expand("hello", "Hello!", Some(&date("2021-03-05T10:00:00Z"))),
        );
        Ok(())
    }

    #[test]
    fn test_all_tokens() -> Result<()> {
        let permalink: Permalink = "/blog/{year}-{month}-{day}/{title}/".parse()?;
        assert_eq!(
            "/blog/2020-12-01/hello-world/",
            permalink.expand("x", "Hello, World", Some(&date("2020-12-01T00:00:00Z"))),
        );
        Ok(())
    }

    #[test]
    fn test_undated_falls_back_to_slug() -> Result<()> {
        let permalink: Permalink = DEFAULT_PATTERN.parse()?;
        assert!(permalink.uses_date());
        assert_eq!("/hello/", permalink.expand("hello", "Hello", None));

        let undated: Permalink = "articles/{slug}".parse()?;
        assert!(!undated.uses_date());
        assert_eq!("/articles/hello/", undated.expand("hello", "Hello", None));
        Ok(())
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            "{year}/{nope}".parse::<Permalink>(),
            Err(Error::UnknownToken(t)) if t == "nope"
        ));
        assert!(matches!(
            "{year}/{slug".parse::<Permalink>(),
            Err(Error::Unterminated(_))
        ));
        assert!(matches!(
            "{year}/{month}".parse::<Permalink>(),
            Err(Error::MissingName(_))
        ));
    }
}
