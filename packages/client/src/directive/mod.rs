//! `Cache-Control` directives and the cacheability/freshness policy
//!
//! Directives are derived from the raw `Cache-Control` header every time a response is
//! evaluated and are never persisted, so the policy can change without touching stored
//! entries.
//!
//! - [`Directive::can_cache`] decides whether a response may be written at all
//! - [`Directive::is_valid`] decides whether a stored response may still be served
//!
//! A [`CacheControl`] list aggregates both with a logical AND, so an empty list (no
//! header) is cacheable and valid forever.

use std::fmt;

use crate::cache::CachedResponse;

pub mod parser;

pub use parser::parse_directives;

/// Name of the header carrying the directives
pub const CACHE_CONTROL_HEADER: &str = "cache-control";

pub const DIRECTIVE_MAX_AGE: &str = "max-age";
pub const DIRECTIVE_S_MAX_AGE: &str = "s-maxage";
pub const DIRECTIVE_PUBLIC: &str = "public";
pub const DIRECTIVE_SHARED: &str = "shared";
pub const DIRECTIVE_PRIVATE: &str = "private";
pub const DIRECTIVE_NO_CACHE: &str = "no-cache";
pub const DIRECTIVE_NO_STORE: &str = "no-store";
pub const DIRECTIVE_MUST_REVALIDATE: &str = "must-revalidate";
pub const DIRECTIVE_PROXY_REVALIDATE: &str = "proxy-revalidate";

/// A single parsed `Cache-Control` directive
///
/// Time-bound variants carry their expiry as epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    MaxAge { expires_at: i64 },
    SharedMaxAge { expires_at: i64 },
    Public,
    Shared,
    Private,
    NoCache,
    NoStore,
    MustRevalidate { expires_at: i64 },
    ProxyRevalidate { expires_at: i64 },
}

impl Directive {
    /// Whether a response carrying this directive may be stored
    #[must_use]
    pub fn can_cache(&self) -> bool {
        !matches!(self, Directive::NoStore)
    }

    /// Whether a stored response carrying this directive is still fresh at `now_millis`
    #[must_use]
    pub fn is_valid(&self, now_millis: i64) -> bool {
        match self {
            Directive::MaxAge { expires_at }
            | Directive::SharedMaxAge { expires_at }
            | Directive::MustRevalidate { expires_at }
            | Directive::ProxyRevalidate { expires_at } => now_millis <= *expires_at,
            Directive::Public | Directive::Shared | Directive::Private => true,
            Directive::NoCache | Directive::NoStore => false,
        }
    }

    /// Expiry of time-bound directives
    #[must_use]
    pub fn expires_at(&self) -> Option<i64> {
        match self {
            Directive::MaxAge { expires_at }
            | Directive::SharedMaxAge { expires_at }
            | Directive::MustRevalidate { expires_at }
            | Directive::ProxyRevalidate { expires_at } => Some(*expires_at),
            _ => None,
        }
    }

    /// Header token this directive was parsed from
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Directive::MaxAge { .. } => DIRECTIVE_MAX_AGE,
            Directive::SharedMaxAge { .. } => DIRECTIVE_S_MAX_AGE,
            Directive::Public => DIRECTIVE_PUBLIC,
            Directive::Shared => DIRECTIVE_SHARED,
            Directive::Private => DIRECTIVE_PRIVATE,
            Directive::NoCache => DIRECTIVE_NO_CACHE,
            Directive::NoStore => DIRECTIVE_NO_STORE,
            Directive::MustRevalidate { .. } => DIRECTIVE_MUST_REVALIDATE,
            Directive::ProxyRevalidate { .. } => DIRECTIVE_PROXY_REVALIDATE,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered list of directives parsed from one response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControl(Vec<Directive>);

impl CacheControl {
    #[must_use]
    pub fn new(directives: Vec<Directive>) -> Self {
        Self(directives)
    }

    /// Directives of a response, stamped with the response's stored-at timestamp
    #[must_use]
    pub fn from_response(response: &CachedResponse) -> Self {
        parse_directives(response.header(CACHE_CONTROL_HEADER), response.timestamp)
    }

    /// True iff every directive allows storing; an empty list is cacheable
    #[must_use]
    pub fn can_cache(&self) -> bool {
        self.0.iter().all(Directive::can_cache)
    }

    /// True iff every directive is still fresh at `now_millis`; an empty list never expires
    #[must_use]
    pub fn is_valid(&self, now_millis: i64) -> bool {
        self.0.iter().all(|directive| directive.is_valid(now_millis))
    }

    /// Latest expiry among time-bound directives
    #[must_use]
    pub fn max_expiry(&self) -> Option<i64> {
        self.0.iter().filter_map(Directive::expires_at).max()
    }

    #[must_use]
    pub fn directives(&self) -> &[Directive] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<Directive>> for CacheControl {
    fn from(directives: Vec<Directive>) -> Self {
        Self(directives)
    }
}

impl<'a> IntoIterator for &'a CacheControl {
    type Item = &'a Directive;
    type IntoIter = std::slice::Iter<'a, Directive>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
