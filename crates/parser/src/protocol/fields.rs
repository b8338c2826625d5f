use http::{HeaderMap, HeaderName, HeaderValue};

use crate::protocol::ParseError;

/// A container that header fields can be inserted into while a header block is parsed.
///
/// Names arrive exactly as they appeared on the wire, values arrive with surrounding whitespace
/// already trimmed. Containers that reject a field fail the whole parse.
pub trait Fields {
    fn insert(&mut self, name: &str, value: &str) -> Result<(), ParseError>;
}

/// An ordered list of header fields that keeps duplicates and the original spelling of names.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldList {
    entries: Vec<(String, String)>,
}

impl FieldList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.entries.push((name.into(), value.into()));
    }

    /// Returns the value of the first field whose name matches case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries.iter().filter(move |(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Fields for FieldList {
    fn insert(&mut self, name: &str, value: &str) -> Result<(), ParseError> {
        self.push(name, value);
        Ok(())
    }
}

impl Fields for HeaderMap {
    fn insert(&mut self, name: &str, value: &str) -> Result<(), ParseError> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(ParseError::malformed_header_field)?;
        let value = HeaderValue::from_str(value).map_err(ParseError::malformed_header_field)?;
        self.append(name, value);
        Ok(())
    }
}
