//! HTTP Header types

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A single HTTP header with name and value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The header name (e.g., "Content-Type")
    pub name: String,
    /// The header value (e.g., "application/json")
    pub value: String,
}

impl Header {
    /// Creates a new header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Checks that the name is a valid HTTP token and the value holds no
    /// control characters.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidHeaderName`] or
    /// [`DomainError::InvalidHeaderValue`].
    pub fn validate(&self) -> DomainResult<()> {
        let name_ok = !self.name.is_empty()
            && self
                .name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
        if !name_ok {
            return Err(DomainError::InvalidHeaderName(self.name.clone()));
        }
        if self.value.chars().any(|c| c.is_control() && c != '\t') {
            return Err(DomainError::InvalidHeaderValue(self.name.clone()));
        }
        Ok(())
    }
}

impl FromStr for Header {
    type Err = DomainError;

    /// Parses `Name: value`, trimming whitespace around both parts.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once(':')
            .ok_or_else(|| DomainError::InvalidHeaderName(s.to_string()))?;
        let header = Self::new(name.trim(), value.trim());
        header.validate()?;
        Ok(header)
    }
}

/// An ordered collection of HTTP headers.
///
/// Names compare case-insensitively; [`set`](Self::set) replaces an
/// existing header in place and keeps the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    items: Vec<Header>,
}

impl Headers {
    /// Creates an empty header collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Sets a header, replacing any header with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .items
            .iter_mut()
            .find(|h| h.name.eq_ignore_ascii_case(&name))
        {
            Some(existing) => {
                existing.name = name;
                existing.value = value;
            }
            None => self.items.push(Header { name, value }),
        }
    }

    /// Sets a header only when none with the same name exists.
    pub fn set_if_absent(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if !self.contains(&name) {
            self.items.push(Header::new(name, value));
        }
    }

    /// Copies every header from `other`, replacing same-named headers.
    pub fn extend_from(&mut self, other: &Self) {
        for header in &other.items {
            self.set(header.name.clone(), header.value.clone());
        }
    }

    /// Returns the value of the named header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Returns true if a header with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns an iterator over the headers.
    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.items.iter()
    }

    /// Returns the number of headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len is not const in stable
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}
