//! Attribute maps and the rules restricting them
//!
//!     Tag-style statements (`lock name="x" timeout=5 { }`), function declarations and
//!     components carry an [`AttributeMap`]: attribute names mapped to expressions. Names are
//!     matched case-insensitively and keep their source order, but always render sorted by
//!     name so the decompiled text is canonical.
//!
//!     Some statements restrict which attributes they accept. [`AttributeRules`] describes
//!     the fixed restrictions; generic tag statements are checked against the syntax
//!     dictionary with [`validate_tag`] instead.

use super::elements::calls::list_item;
use super::error::{DecompileResult, MalformedConstruct};
use super::expression::{Expression, ExpressionKind};
use super::range::Position;
use crate::cfml::grammar::dictionary::TagSyntax;

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeMap {
    entries: Vec<Attribute>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace, matching the name case-insensitively
    pub fn insert(&mut self, name: impl Into<String>, value: Expression) {
        let name = name.into();
        match self
            .entries
            .iter_mut()
            .find(|attribute| attribute.name.eq_ignore_ascii_case(&name))
        {
            Some(existing) => existing.value = value,
            None => self.entries.push(Attribute { name, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Expression> {
        self.entries
            .iter()
            .find(|attribute| attribute.name.eq_ignore_ascii_case(name))
            .map(|attribute| &attribute.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Value of a string-literal attribute
    pub fn string_value(&self, name: &str) -> Option<&str> {
        match &self.get(name)?.kind {
            ExpressionKind::Literal(literal) if literal.is_string() => Some(literal.raw.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attributes in source order
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|attribute| attribute.name.as_str()).collect()
    }

    pub fn values(&self) -> Vec<&Expression> {
        self.entries.iter().map(|attribute| &attribute.value).collect()
    }

    /// Attributes sorted by name, ignoring case
    pub fn sorted(&self) -> Vec<&Attribute> {
        let mut sorted: Vec<&Attribute> = self.entries.iter().collect();
        sorted.sort_by(|a, b| {
            a.name
                .to_ascii_lowercase()
                .cmp(&b.name.to_ascii_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        sorted
    }

    /// `name=value` pairs separated by spaces
    pub fn render(&self, indent: usize) -> DecompileResult {
        let rendered = self
            .sorted()
            .into_iter()
            .map(|attribute| Ok(format!("{}={}", attribute.name, list_item(&attribute.value, indent)?)))
            .collect::<Result<Vec<String>, MalformedConstruct>>()?;
        Ok(rendered.join(" "))
    }

    /// The rendered map preceded by a space, or nothing when empty
    pub fn render_suffix(&self, indent: usize) -> DecompileResult {
        if self.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(" {}", self.render(indent)?))
    }
}

impl FromIterator<Attribute> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut map = AttributeMap::new();
        for attribute in iter {
            map.insert(attribute.name, attribute.value);
        }
        map
    }
}

/// Fixed attribute restrictions of a statement keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeRules {
    pub statement: &'static str,
    pub allowed: &'static [&'static str],
    /// Pairs that may not appear together
    pub exclusive: &'static [(&'static str, &'static str)],
    /// At least one of these must be present, when non-empty
    pub required_any: &'static [&'static str],
}

const LOCK: AttributeRules = AttributeRules {
    statement: "lock",
    allowed: &["name", "scope", "timeout", "type", "throwontimeout"],
    exclusive: &[("name", "scope")],
    required_any: &["name", "scope", "timeout"],
};

const TRANSACTION: AttributeRules = AttributeRules {
    statement: "transaction",
    allowed: &["action", "isolation", "savepoint", "nested", "datasource"],
    exclusive: &[],
    required_any: &[],
};

const PARAM: AttributeRules = AttributeRules {
    statement: "param",
    allowed: &["name", "type", "default", "min", "max", "pattern", "maxlength"],
    exclusive: &[],
    required_any: &["name"],
};

impl AttributeRules {
    /// Rules for a statement keyword; unrestricted keywords have none
    pub fn for_keyword(keyword: &str) -> Option<&'static AttributeRules> {
        [&LOCK, &TRANSACTION, &PARAM]
            .into_iter()
            .find(|rules| rules.statement.eq_ignore_ascii_case(keyword))
    }

    pub fn allows(&self, name: &str) -> bool {
        self.allowed.iter().any(|allowed| allowed.eq_ignore_ascii_case(name))
    }

    pub fn check(&self, attributes: &AttributeMap, position: Position) -> Result<(), MalformedConstruct> {
        if let Some(unknown) = attributes.names().into_iter().find(|name| !self.allows(name)) {
            return Err(MalformedConstruct::UnknownAttribute {
                statement: self.statement.to_string(),
                attribute: unknown.to_string(),
                position,
            });
        }

        for (first, second) in self.exclusive {
            if attributes.contains(first) && attributes.contains(second) {
                return Err(MalformedConstruct::ConflictingAttributes {
                    statement: self.statement.to_string(),
                    first: first.to_string(),
                    second: second.to_string(),
                    position,
                });
            }
        }

        if !self.required_any.is_empty()
            && !self.required_any.iter().any(|name| attributes.contains(name))
        {
            return Err(MalformedConstruct::MissingAttribute {
                statement: self.statement.to_string(),
                expected: self.required_any.iter().map(|name| name.to_string()).collect(),
                position,
            });
        }
        Ok(())
    }
}

/// Check a generic tag statement against its dictionary entry
pub fn validate_tag(
    name: &str,
    syntax: Option<&TagSyntax>,
    attributes: &AttributeMap,
    has_body: bool,
    position: Position,
) -> Result<(), MalformedConstruct> {
    let Some(syntax) = syntax else {
        return Err(MalformedConstruct::UnknownTag {
            name: name.to_string(),
            position,
        });
    };

    if syntax.is_single && has_body {
        return Err(MalformedConstruct::UnexpectedBody {
            name: name.to_string(),
            position,
        });
    }

    if !syntax.has_parameters {
        if let Some(first) = attributes.names().first() {
            return Err(MalformedConstruct::UnknownAttribute {
                statement: name.to_string(),
                attribute: first.to_string(),
                position,
            });
        }
    }

    if !syntax.attributes.is_empty() {
        if let Some(unknown) = attributes
            .names()
            .into_iter()
            .find(|attribute| !syntax.accepts(attribute))
        {
            return Err(MalformedConstruct::UnknownAttribute {
                statement: name.to_string(),
                attribute: unknown.to_string(),
                position,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfml::ast::elements::Literal;
    use crate::cfml::ast::node::{NodeId, NodeInfo};

    fn string(value: &str) -> Expression {
        Expression::new(
            NodeInfo::new(NodeId(0), 0..value.len(), Position::default(), value),
            ExpressionKind::Literal(Literal::string(value)),
        )
    }

    fn map(pairs: &[(&str, &str)]) -> AttributeMap {
        pairs
            .iter()
            .map(|(name, value)| Attribute {
                name: name.to_string(),
                value: string(value),
            })
            .collect()
    }

    #[test]
    fn test_render_sorts_case_insensitively() {
        let attributes = map(&[("timeout", "5"), ("Name", "x"), ("action", "y")]);
        assert_eq!(
            attributes.render(0).unwrap(),
            "action='y' Name='x' timeout='5'"
        );
        assert_eq!(attributes.names(), vec!["timeout", "Name", "action"]);
    }

    #[test]
    fn test_insert_replaces_ignoring_case() {
        let mut attributes = map(&[("name", "a")]);
        attributes.insert("NAME", string("b"));
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes.string_value("Name"), Some("b"));
    }

    #[test]
    fn test_lock_rules() {
        let rules = AttributeRules::for_keyword("LOCK").unwrap();
        let position = Position::new(1, 0);

        assert!(rules.check(&map(&[("timeout", "1")]), position).is_ok());
        assert!(matches!(
            rules.check(&map(&[("NAME", "a"), ("SCOPE", "b")]), position),
            Err(MalformedConstruct::ConflictingAttributes { .. })
        ));
        assert!(matches!(
            rules.check(&map(&[("type", "readonly")]), position),
            Err(MalformedConstruct::MissingAttribute { .. })
        ));
        assert!(matches!(
            rules.check(&map(&[("name", "a"), ("color", "red")]), position),
            Err(MalformedConstruct::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_unrestricted_keywords() {
        assert!(AttributeRules::for_keyword("thread").is_none());
        assert!(AttributeRules::for_keyword("admin").is_none());
    }

    #[test]
    fn test_validate_tag() {
        let position = Position::new(1, 0);
        let single = TagSyntax::new()
            .single()
            .with_attributes(["url", "method"]);

        assert!(validate_tag("http", Some(&single), &map(&[("url", "x")]), false, position).is_ok());
        assert!(matches!(
            validate_tag("http", Some(&single), &map(&[]), true, position),
            Err(MalformedConstruct::UnexpectedBody { .. })
        ));
        assert!(matches!(
            validate_tag("http", Some(&single), &map(&[("port", "1")]), false, position),
            Err(MalformedConstruct::UnknownAttribute { .. })
        ));
        assert!(matches!(
            validate_tag("nope", None, &map(&[]), false, position),
            Err(MalformedConstruct::UnknownTag { .. })
        ));

        let bare = TagSyntax::new().without_parameters();
        assert!(validate_tag("flush", Some(&bare), &map(&[("a", "b")]), false, position).is_err());
    }
}
