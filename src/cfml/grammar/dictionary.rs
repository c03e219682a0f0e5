//! Tag syntax lookup
//!
//!     Which tags exist, and what they accept, is owned by whoever embeds the parser. The
//!     visitors only ask one question through [`SyntaxDictionary`]: what is known about the
//!     tag with this name. [`StaticDictionary`] is an in-memory answer to it, populated by the
//!     caller; there is no built-in registry.

use std::collections::HashMap;

/// What the dictionary knows about one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSyntax {
    /// Takes no body
    pub is_single: bool,
    /// Accepts attributes at all
    pub has_parameters: bool,
    pub is_xml_style: bool,
    /// Accepted attribute names, lower case. Empty means any.
    pub attributes: Vec<String>,
}

impl Default for TagSyntax {
    fn default() -> Self {
        Self {
            is_single: false,
            has_parameters: true,
            is_xml_style: false,
            attributes: Vec::new(),
        }
    }
}

impl TagSyntax {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(mut self) -> Self {
        self.is_single = true;
        self
    }

    pub fn without_parameters(mut self) -> Self {
        self.has_parameters = false;
        self
    }

    pub fn xml_style(mut self) -> Self {
        self.is_xml_style = true;
        self
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.attributes = attributes
            .into_iter()
            .map(|name| name.as_ref().to_ascii_lowercase())
            .collect();
        self
    }

    /// Whether the attribute list allows `name`; an empty list allows everything
    pub fn accepts(&self, name: &str) -> bool {
        self.attributes.is_empty()
            || self
                .attributes
                .iter()
                .any(|attribute| attribute.eq_ignore_ascii_case(name))
    }
}

pub trait SyntaxDictionary: Send + Sync {
    /// Look up a tag by name. Names are case-insensitive.
    fn lookup_tag(&self, name: &str) -> Option<TagSyntax>;
}

/// Resolve a tag as written in script: the exact name first, then without its `cf` prefix
pub fn resolve_tag(dictionary: &dyn SyntaxDictionary, name: &str) -> Option<TagSyntax> {
    let lower = name.to_ascii_lowercase();
    dictionary.lookup_tag(&lower).or_else(|| {
        lower
            .strip_prefix("cf")
            .filter(|stripped| !stripped.is_empty())
            .and_then(|stripped| dictionary.lookup_tag(stripped))
    })
}

/// Caller-populated dictionary
#[derive(Debug, Clone, Default)]
pub struct StaticDictionary {
    tags: HashMap<String, TagSyntax>,
}

impl StaticDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, name: &str, syntax: TagSyntax) -> Self {
        self.insert(name, syntax);
        self
    }

    pub fn insert(&mut self, name: &str, syntax: TagSyntax) {
        self.tags.insert(name.to_ascii_lowercase(), syntax);
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl SyntaxDictionary for StaticDictionary {
    fn lookup_tag(&self, name: &str) -> Option<TagSyntax> {
        self.tags.get(&name.to_ascii_lowercase()).cloned()
    }
}
