//! Filter matching for interceptor selection.
//!
//! A [`Filter`] is a rule over `(method, url, kind)` where every field is
//! either an exact value or the `*` wildcard. Matching is exact string
//! comparison only: there is no prefix or regex matching on the URL.
//!
//! `kind` is the request `Content-Type` for request interceptors and the
//! declared response shape (`json`, `text`, ...) for response interceptors.
//!
//! # Key strings
//!
//! Filters can also be written as a space separated key:
//!
//! - `/users` - any method, any kind
//! - `GET /users` - GET only, any kind
//! - `GET /users json` - GET with a json response
//!
//! URLs used in key strings therefore cannot contain spaces.

use crate::error::FilterParseError;
use std::fmt;
use std::str::FromStr;

const WILDCARD: &str = "*";

/// One field of a [`Filter`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Pattern {
    #[default]
    Any,
    Exact(String),
}

impl Pattern {
    /// `*` becomes [`Pattern::Any`], anything else an exact match.
    pub fn parse(value: &str) -> Self {
        if value == WILDCARD {
            Pattern::Any
        } else {
            Pattern::Exact(value.to_string())
        }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Exact(expected) => value == Some(expected.as_str()),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Pattern::Any)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Any => f.write_str(WILDCARD),
            Pattern::Exact(value) => f.write_str(value),
        }
    }
}

/// Matching rule for interceptors. Also serves as the registry key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Filter {
    pub method: Pattern,
    pub url: Pattern,
    pub kind: Pattern,
}

impl Filter {
    /// Filter on an exact URL, any method and any kind.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Pattern::parse(&url.into()),
            ..Self::default()
        }
    }

    /// Filter matching every request.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: &str) -> Self {
        self.method = Pattern::parse(&method.to_uppercase());
        self
    }

    pub fn kind(mut self, kind: &str) -> Self {
        self.kind = Pattern::parse(kind);
        self
    }

    pub fn matches(&self, target: &RequestTarget) -> bool {
        if !self.url.matches(Some(&target.url)) {
            return false;
        }
        self.method.matches(Some(&target.method)) && self.kind.matches(target.kind.as_deref())
    }

    /// Prefix a non-wildcard URL with the client base URL.
    pub(crate) fn with_base_url(mut self, base_url: &str) -> Self {
        if let Pattern::Exact(url) = &self.url {
            self.url = Pattern::Exact(format!("{base_url}{url}"));
        }
        self
    }
}

impl FromStr for Filter {
    type Err = FilterParseError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = key.split_whitespace().collect();
        match parts.as_slice() {
            [] => Err(FilterParseError::Empty),
            [url] => Ok(Filter::url(*url)),
            [method, url] => Ok(Filter::url(*url).method(method)),
            [method, url, kind] => Ok(Filter::url(*url).method(method).kind(kind)),
            _ => Err(FilterParseError::TooManyParts(key.to_string())),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.url, self.kind)
    }
}

/// Anything the registration API accepts as a filter.
pub trait IntoFilter {
    fn into_filter(self) -> Result<Filter, FilterParseError>;
}

impl IntoFilter for Filter {
    fn into_filter(self) -> Result<Filter, FilterParseError> {
        Ok(self)
    }
}

impl IntoFilter for &str {
    fn into_filter(self) -> Result<Filter, FilterParseError> {
        self.parse()
    }
}

impl IntoFilter for String {
    fn into_filter(self) -> Result<Filter, FilterParseError> {
        self.parse()
    }
}

/// Concrete request attributes a [`Filter`] is matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub method: String,
    pub url: String,
    pub kind: Option<String>,
}

impl RequestTarget {
    pub fn new(method: &str, url: impl Into<String>, kind: Option<&str>) -> Self {
        Self {
            method: method.to_uppercase(),
            url: url.into(),
            kind: kind.map(str::to_string),
        }
    }
}
