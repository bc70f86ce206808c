//! Query parsing: raw user text to a concrete needle.

use log::debug;
use regex::Regex;

use super::{SearchDomain, SearchMode};

/// A parsed query, ready to run against a haystack.
#[derive(Debug, Clone)]
pub enum Needle {
    /// Exact byte sequence (hex mode).
    Bytes(Vec<u8>),
    /// Literal text (string mode).
    Text(String),
    /// Compiled regular expression (regex mode).
    Pattern(Regex),
}

impl Needle {
    /// Parse `query` under a resolved (non-`Auto`) `mode`.
    ///
    /// Returns `None` for malformed input: a bad hex token or an unparseable
    /// regex invalidates the whole query and yields zero matches upstream.
    #[must_use]
    pub fn build(query: &str, mode: SearchMode, domain: SearchDomain) -> Option<Self> {
        let q = query.trim();
        if q.is_empty() {
            return None;
        }
        match mode {
            SearchMode::Auto => unreachable!("mode must be resolved before building a needle"),
            SearchMode::Hex => parse_hex_query(q).map(Needle::Bytes),
            SearchMode::Text => Some(Needle::Text(q.to_string())),
            SearchMode::Regex => {
                // Line domains match case-insensitively, memory does not.
                let force_ci = domain != SearchDomain::Memory;
                parse_regex_query(q, force_ci).map(Needle::Pattern)
            }
        }
    }
}

/// Tokenize a hex query into bytes.
///
/// Accepts `"41 42"`, `"0x41 0x42"`, `"4142"`, `"41 4243"`. Tokens are
/// whitespace-separated, optionally `0x`-prefixed, and must be a 2-digit
/// group or a longer even-length run (split into byte pairs). Any malformed
/// token invalidates the whole query.
#[must_use]
pub fn parse_hex_query(query: &str) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    for token in query.split_whitespace() {
        let hex = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        if hex.len() < 2 || hex.len() % 2 != 0 {
            return None;
        }
        for i in (0..hex.len()).step_by(2) {
            match u8::from_str_radix(&hex[i..i + 2], 16) {
                Ok(b) => out.push(b),
                Err(_) => return None,
            }
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Parse a `/pattern/flags` query into a compiled regex.
///
/// Supported flags are `i`, `m`, `s` (applied inline); `g`, `u` and `y` are
/// accepted for familiarity and ignored — matching is always global here.
fn parse_regex_query(query: &str, force_case_insensitive: bool) -> Option<Regex> {
    if !query.starts_with('/') {
        return None;
    }
    let last = query.rfind('/')?;
    if last == 0 {
        return None;
    }
    let pattern = &query[1..last];
    let mut flags: String = query[last + 1..]
        .chars()
        .filter(|c| matches!(c, 'i' | 'm' | 's'))
        .collect();
    if force_case_insensitive && !flags.contains('i') {
        flags.push('i');
    }
    let full = if flags.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{flags}){pattern}")
    };
    match Regex::new(&full) {
        Ok(re) => Some(re),
        Err(err) => {
            debug!("rejecting regex query {query:?}: {err}");
            None
        }
    }
}
