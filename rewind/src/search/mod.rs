//! Incremental pattern search shared by three domains.
//!
//! One algorithmic core serves the memory dump, the disassembly listing and
//! the syscall log. A query is parsed into a [`Needle`] (hex bytes, literal
//! text, or a regex), a domain-specific [`Haystack`] finds the matches, and a
//! [`SearchSession`] holds the per-domain state: query, resolved mode, match
//! list and the cyclic current-match pointer.
//!
//! The three sessions are independent but share identical semantics:
//! - changing the query or mode recomputes the match list eagerly,
//! - re-running an unchanged search never moves the current pointer,
//! - next/prev wrap around and are no-ops on an empty match list,
//! - malformed input (bad hex token, unparseable regex) degrades to zero
//!   matches with an "invalid" status, never an error.

pub mod haystack;
pub mod needle;

pub use haystack::{Haystack, LineHaystack, MemoryHaystack, SearchHit, SEARCH_MATCH_CAP};
pub use needle::Needle;

use std::fmt;

/// How a query is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Infer per-query: `/pattern/flags` is regex, bare hex digits are hex,
    /// anything else is literal text.
    #[default]
    Auto,
    /// Byte-pattern search over raw bytes (or a hex substring for listings).
    Hex,
    /// Literal text search.
    Text,
    /// Regular expression, delimited `/pattern/flags`.
    Regex,
}

/// Which view a search session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDomain {
    Memory,
    Disassembly,
    SyscallLog,
}

/// Whether a query is framed as `/pattern/flags`.
fn looks_like_regex(query: &str) -> bool {
    if !query.starts_with('/') {
        return false;
    }
    match query.rfind('/') {
        Some(last) if last > 0 => query[last + 1..].chars().all(|c| "gimsuy".contains(c)),
        _ => false,
    }
}

/// Whether a query consists solely of hex digits, `0x` prefixes and
/// whitespace, with at least one actual hex digit.
fn looks_like_hex(query: &str) -> bool {
    let mut has_digit = false;
    for c in query.chars() {
        match c {
            '0'..='9' | 'a'..='f' | 'A'..='F' => has_digit = true,
            'x' | 'X' => {}
            c if c.is_whitespace() => {}
            _ => return false,
        }
    }
    has_digit
}

/// Infer the effective mode for an `Auto` query.
///
/// Pure and domain-aware: the syscall log never infers `Hex` (a bare number
/// there is almost always an argument value, searched as text).
#[must_use]
pub fn infer_mode(query: &str, domain: SearchDomain) -> SearchMode {
    let q = query.trim();
    if looks_like_regex(q) {
        return SearchMode::Regex;
    }
    if domain != SearchDomain::SyscallLog && looks_like_hex(q) {
        return SearchMode::Hex;
    }
    SearchMode::Text
}

/// Resolve a requested mode to a concrete one for `query`.
#[must_use]
pub fn resolve_mode(query: &str, mode: SearchMode, domain: SearchDomain) -> SearchMode {
    match mode {
        SearchMode::Auto => infer_mode(query, domain),
        m => m,
    }
}

/// Match-count summary derived from the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// No query entered.
    Idle,
    /// Query was syntactically invalid (bad hex token or regex).
    Invalid,
    NoMatches,
    At {
        /// Zero-based index of the current match.
        current: usize,
        total: usize,
        /// The match list hit the internal cap; more matches exist.
        overflow: bool,
    },
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => Ok(()),
            Self::Invalid => write!(f, "invalid pattern"),
            Self::NoMatches => write!(f, "no matches"),
            Self::At {
                current,
                total,
                overflow,
            } => {
                let cap = if *overflow { "+" } else { "" };
                write!(f, "{}/{}{}", current + 1, total, cap)
            }
        }
    }
}

/// Per-domain search state: query, resolved mode, matches, current pointer.
#[derive(Debug, Clone)]
pub struct SearchSession {
    domain: SearchDomain,
    query: String,
    mode: SearchMode,
    resolved: Option<SearchMode>,
    matches: Vec<SearchHit>,
    current: Option<usize>,
    overflow: bool,
    valid: bool,
}

impl SearchSession {
    #[must_use]
    pub fn new(domain: SearchDomain) -> Self {
        Self {
            domain,
            query: String::new(),
            mode: SearchMode::Auto,
            resolved: None,
            matches: Vec::new(),
            current: None,
            overflow: false,
            valid: true,
        }
    }

    #[must_use]
    pub fn domain(&self) -> SearchDomain {
        self.domain
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// The mode the last query actually ran under (`None` until a query ran).
    #[must_use]
    pub fn resolved_mode(&self) -> Option<SearchMode> {
        self.resolved
    }

    #[must_use]
    pub fn matches(&self) -> &[SearchHit] {
        &self.matches
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    #[must_use]
    pub fn current(&self) -> Option<SearchHit> {
        self.current.map(|i| self.matches[i])
    }

    /// Reset to the empty state (new program load).
    pub fn clear(&mut self) {
        self.query.clear();
        self.mode = SearchMode::Auto;
        self.resolved = None;
        self.matches.clear();
        self.current = None;
        self.overflow = false;
        self.valid = true;
    }

    /// Run `query` against `haystack`, recomputing the match list eagerly.
    ///
    /// An unchanged `(query, mode)` that yields an identical match list keeps
    /// the current-match pointer where it is.
    pub fn run(&mut self, query: &str, mode: SearchMode, haystack: &dyn Haystack) {
        let q = query.trim();
        if q.is_empty() {
            self.install(query, mode, None, Vec::new(), false, true);
            return;
        }
        let resolved = resolve_mode(q, mode, self.domain);
        match Needle::build(q, resolved, self.domain) {
            Some(needle) => {
                let (matches, overflow) = haystack.find(&needle);
                self.install(query, mode, Some(resolved), matches, overflow, true);
            }
            None => self.install(query, mode, Some(resolved), Vec::new(), false, false),
        }
    }

    /// Install a precomputed match list (engine-native memory fast path).
    pub fn install(
        &mut self,
        query: &str,
        mode: SearchMode,
        resolved: Option<SearchMode>,
        matches: Vec<SearchHit>,
        overflow: bool,
        valid: bool,
    ) {
        let unchanged =
            self.query == query && self.mode == mode && self.matches == matches;
        self.query = query.to_string();
        self.mode = mode;
        self.resolved = resolved;
        self.overflow = overflow;
        self.valid = valid;
        if unchanged {
            return;
        }
        self.matches = matches;
        self.current = if self.matches.is_empty() { None } else { Some(0) };
    }

    /// Advance to the next match with wraparound. No-op when empty.
    pub fn next(&mut self) -> Option<SearchHit> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }
        let cur = self.current.map_or(0, |i| (i + 1) % len);
        self.current = Some(cur);
        Some(self.matches[cur])
    }

    /// Step to the previous match with wraparound. No-op when empty.
    pub fn prev(&mut self) -> Option<SearchHit> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }
        let cur = self.current.map_or(len - 1, |i| (i + len - 1) % len);
        self.current = Some(cur);
        Some(self.matches[cur])
    }

    #[must_use]
    pub fn status(&self) -> SearchStatus {
        if self.query.trim().is_empty() {
            return SearchStatus::Idle;
        }
        if !self.valid {
            return SearchStatus::Invalid;
        }
        match self.current {
            None => SearchStatus::NoMatches,
            Some(current) => SearchStatus::At {
                current,
                total: self.matches.len(),
                overflow: self.overflow,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_regex() {
        assert_eq!(
            infer_mode("/mov.*rax/", SearchDomain::Disassembly),
            SearchMode::Regex
        );
        assert_eq!(
            infer_mode("/open/i", SearchDomain::SyscallLog),
            SearchMode::Regex
        );
        // A lone slash is not a regex frame
        assert_eq!(infer_mode("/", SearchDomain::Memory), SearchMode::Text);
        // Bad trailing flags are not a regex frame either
        assert_eq!(infer_mode("/a/z", SearchDomain::Memory), SearchMode::Text);
    }

    #[test]
    fn test_infer_hex() {
        assert_eq!(infer_mode("41 42 43", SearchDomain::Memory), SearchMode::Hex);
        assert_eq!(infer_mode("0xdeadbeef", SearchDomain::Memory), SearchMode::Hex);
        assert_eq!(infer_mode("cafe", SearchDomain::Memory), SearchMode::Hex);
        assert_eq!(infer_mode("hello", SearchDomain::Memory), SearchMode::Text);
        // Whitespace alone carries no hex digit
        assert_eq!(infer_mode("x x", SearchDomain::Memory), SearchMode::Text);
    }

    #[test]
    fn test_syscall_log_never_infers_hex() {
        assert_eq!(infer_mode("42", SearchDomain::SyscallLog), SearchMode::Text);
        assert_eq!(
            infer_mode("/write/", SearchDomain::SyscallLog),
            SearchMode::Regex
        );
    }

    #[test]
    fn test_cyclic_navigation_returns_to_start() {
        let hay = LineHaystack::from_lines(vec![
            "mov rax, 1".into(),
            "xor rbx, rbx".into(),
            "mov rcx, 2".into(),
        ]);
        let mut s = SearchSession::new(SearchDomain::SyscallLog);
        s.run("mov", SearchMode::Auto, &hay);
        assert_eq!(s.matches().len(), 2);
        assert_eq!(s.current_index(), Some(0));

        let start = s.current_index();
        for _ in 0..2 {
            s.next();
        }
        assert_eq!(s.current_index(), start);
        for _ in 0..2 {
            s.prev();
        }
        assert_eq!(s.current_index(), start);
    }

    #[test]
    fn test_next_prev_noop_when_empty() {
        let hay = LineHaystack::from_lines(vec!["nop".into()]);
        let mut s = SearchSession::new(SearchDomain::Disassembly);
        s.run("missing", SearchMode::Text, &hay);
        assert!(s.next().is_none());
        assert!(s.prev().is_none());
        assert_eq!(s.current_index(), None);
    }

    #[test]
    fn test_rerun_unchanged_keeps_current() {
        let hay = LineHaystack::from_lines(vec![
            "call foo".into(),
            "call bar".into(),
            "call baz".into(),
        ]);
        let mut s = SearchSession::new(SearchDomain::Disassembly);
        s.run("call", SearchMode::Auto, &hay);
        s.next();
        assert_eq!(s.current_index(), Some(1));

        s.run("call", SearchMode::Auto, &hay);
        assert_eq!(s.current_index(), Some(1));
        assert_eq!(s.matches().len(), 3);

        // Changing the query resets the pointer
        s.run("foo", SearchMode::Auto, &hay);
        assert_eq!(s.current_index(), Some(0));
    }

    #[test]
    fn test_invalid_regex_yields_invalid_status() {
        let hay = LineHaystack::from_lines(vec!["mov rax, 1".into()]);
        let mut s = SearchSession::new(SearchDomain::Disassembly);
        s.run("/(/", SearchMode::Auto, &hay);
        assert!(s.matches().is_empty());
        assert_eq!(s.status(), SearchStatus::Invalid);
        assert_eq!(s.status().to_string(), "invalid pattern");
    }

    #[test]
    fn test_status_display() {
        let hay = LineHaystack::from_lines(vec!["inc eax".into(), "inc ebx".into()]);
        let mut s = SearchSession::new(SearchDomain::Disassembly);
        assert_eq!(s.status().to_string(), "");
        s.run("inc", SearchMode::Auto, &hay);
        assert_eq!(s.status().to_string(), "1/2");
        s.next();
        assert_eq!(s.status().to_string(), "2/2");
        s.run("jmp", SearchMode::Auto, &hay);
        assert_eq!(s.status().to_string(), "no matches");
    }
}
