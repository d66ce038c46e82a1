//! Defines the [`Tag`] type, which represents a [`crate::document::Document`]
//! tag.

use gtmpl::Value;
use std::hash::{Hash, Hasher};
use url::Url;

/// Represents a post tag. The `url` points at the first page of the tag's
/// listing, i.e., `{site_root}/tags/{name}/`.
#[derive(Clone, Debug)]
pub struct Tag {
    /// The tag's name. This is slugified so e.g., `macOS` and `MacOS`
    /// resolve to the same value, and also so the field can be dropped into a
    /// route.
    pub name: String,

    /// The URL for the tag's first listing page.
    pub url: Url,
}

/// The site-relative route of the first listing page for tag `name`.
pub fn route(name: &str) -> String {
    format!("/tags/{}/", name)
}

impl Hash for Tag {
    /// Implements [`Hash`] for [`Tag`] by delegating directly to the `name`
    /// field.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by delegating directly
    /// to the `name` field.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Tag {}

impl From<&Tag> for Value {
    /// Converts [`Tag`]s into [`Value`]s for templating.
    fn from(t: &Tag) -> Value {
        use std::collections::HashMap;
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("tag".to_owned(), Value::String(t.name.clone()));
        m.insert("url".to_owned(), Value::String(t.url.to_string()));
        Value::Object(m)
    }
}
