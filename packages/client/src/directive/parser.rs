//! `Cache-Control` header parsing
//!
//! The grammar handled here is deliberately small: whitespace is stripped, tokens are
//! split on `,` and each token on its first `=`. A single max-age value is extracted once
//! (from the first token whose name contains `max-age`) and shared by every time-bound
//! directive in the header, so `s-maxage=60, max-age=300` yields two directives expiring
//! 300 seconds after the response was stored. Unlike RFC 7234, directives do not carry
//! their own values.

use super::{
    CacheControl, DIRECTIVE_MAX_AGE, DIRECTIVE_MUST_REVALIDATE, DIRECTIVE_NO_CACHE,
    DIRECTIVE_NO_STORE, DIRECTIVE_PRIVATE, DIRECTIVE_PROXY_REVALIDATE, DIRECTIVE_PUBLIC,
    DIRECTIVE_S_MAX_AGE, DIRECTIVE_SHARED, Directive,
};

const KEY_VALUE_DELIMITER: char = '=';
const TOKEN_DELIMITER: char = ',';

/// Parse a `Cache-Control` header value into directives
///
/// Time-bound directives expire `max-age` seconds after `stored_at_millis`. Unknown
/// tokens, and time-bound tokens without a usable max-age, are dropped. Never fails.
#[must_use]
pub fn parse_directives(header: Option<&str>, stored_at_millis: i64) -> CacheControl {
    let Some(header) = header else {
        return CacheControl::default();
    };

    let compact: String = header.chars().filter(|c| !c.is_whitespace()).collect();
    let tokens: Vec<(&str, Option<&str>)> = compact
        .split(TOKEN_DELIMITER)
        .map(|token| match token.split_once(KEY_VALUE_DELIMITER) {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        })
        .collect();

    let expires_at = shared_max_age(&tokens).map(|seconds| {
        stored_at_millis.saturating_add(seconds.saturating_mul(1000))
    });

    let directives = tokens
        .iter()
        .filter_map(|&(name, _)| directive_for(name, expires_at))
        .collect();

    CacheControl::new(directives)
}

/// Seconds of the first token whose name mentions `max-age`
fn shared_max_age(tokens: &[(&str, Option<&str>)]) -> Option<i64> {
    tokens
        .iter()
        .find(|(name, _)| name.contains(DIRECTIVE_MAX_AGE))
        .and_then(|(_, value)| *value)
        .and_then(|value| value.parse::<i64>().ok())
}

fn directive_for(name: &str, expires_at: Option<i64>) -> Option<Directive> {
    let directive = match name {
        DIRECTIVE_MAX_AGE => Directive::MaxAge {
            expires_at: expires_at?,
        },
        DIRECTIVE_S_MAX_AGE => Directive::SharedMaxAge {
            expires_at: expires_at?,
        },
        DIRECTIVE_PUBLIC => Directive::Public,
        DIRECTIVE_SHARED => Directive::Shared,
        DIRECTIVE_PRIVATE => Directive::Private,
        DIRECTIVE_NO_CACHE => Directive::NoCache,
        DIRECTIVE_NO_STORE => Directive::NoStore,
        DIRECTIVE_MUST_REVALIDATE => Directive::MustRevalidate {
            expires_at: expires_at?,
        },
        DIRECTIVE_PROXY_REVALIDATE => Directive::ProxyRevalidate {
            expires_at: expires_at?,
        },
        _ => {
            if !name.is_empty() {
                tracing::trace!(
                    target: "netcache::directive",
                    directive = name,
                    "Ignoring unrecognized cache-control directive"
                );
            }
            return None;
        }
    };
    Some(directive)
}
