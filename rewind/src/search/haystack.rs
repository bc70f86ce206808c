//! Domain haystacks: where needles are searched.
//!
//! Two shapes cover all three domains: a byte buffer (memory) and a line
//! list (disassembly, syscall log). Each implements [`Haystack`] once per
//! needle kind, so the hex/string/regex logic is not repeated per call site.

use crate::engine::DisasmLine;

use super::Needle;

/// Internal cap on match-list size, for responsiveness on large haystacks.
/// Hitting the cap sets the overflow marker in the session status.
pub const SEARCH_MATCH_CAP: usize = 2000;

/// One match in domain-native coordinates: a byte offset (or absolute
/// address) plus length for memory, a line index with length 1 for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    pub start: u64,
    pub len: usize,
}

/// A searchable projection of one domain's data.
pub trait Haystack {
    /// Number of addressable positions (bytes or lines).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All matches of `needle`, left to right, capped at
    /// [`SEARCH_MATCH_CAP`]. The second value reports whether the cap was
    /// hit.
    fn find(&self, needle: &Needle) -> (Vec<SearchHit>, bool);
}

/// Raw memory bytes starting at `base`. Unmapped bytes must already read as
/// zero; they match hex/string needles as `0x00` and project to `.` for
/// regex, exactly like mapped non-printable bytes.
pub struct MemoryHaystack<'a> {
    pub base: u64,
    pub bytes: &'a [u8],
}

/// Overlap-permitting byte scan.
fn scan_bytes(bytes: &[u8], needle: &[u8], base: u64, out: &mut Vec<SearchHit>) -> bool {
    if needle.is_empty() || needle.len() > bytes.len() {
        return false;
    }
    for i in 0..=(bytes.len() - needle.len()) {
        if &bytes[i..i + needle.len()] == needle {
            out.push(SearchHit {
                start: base + i as u64,
                len: needle.len(),
            });
            if out.len() >= SEARCH_MATCH_CAP {
                return true;
            }
        }
    }
    false
}

/// Printable-ASCII projection used for regex over memory: bytes in
/// `0x20..0x7f` keep their character, everything else becomes `.`.
#[must_use]
pub fn ascii_projection(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if (0x20..0x7f).contains(&b) {
                b as char
            } else {
                '.'
            }
        })
        .collect()
}

impl Haystack for MemoryHaystack<'_> {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn find(&self, needle: &Needle) -> (Vec<SearchHit>, bool) {
        let mut out = Vec::new();
        let overflow = match needle {
            Needle::Bytes(bytes) => scan_bytes(self.bytes, bytes, self.base, &mut out),
            Needle::Text(text) => scan_bytes(self.bytes, text.as_bytes(), self.base, &mut out),
            Needle::Pattern(re) => {
                let projected = ascii_projection(self.bytes);
                let mut overflow = false;
                for m in re.find_iter(&projected) {
                    out.push(SearchHit {
                        start: self.base + m.start() as u64,
                        len: m.len(),
                    });
                    if out.len() >= SEARCH_MATCH_CAP {
                        overflow = true;
                        break;
                    }
                }
                overflow
            }
        };
        (out, overflow)
    }
}

/// A list of display lines. Matching is case-insensitive: listings mix case
/// freely (`MOV` vs `mov`, `0xDEAD` vs `0xdead`).
pub struct LineHaystack {
    lines: Vec<String>,
}

impl LineHaystack {
    #[must_use]
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Compose disassembly lines as `"{addr} {text}"`, the representation
    /// both literal and hex needles match against.
    #[must_use]
    pub fn from_disasm(lines: &[DisasmLine]) -> Self {
        Self {
            lines: lines
                .iter()
                .map(|l| format!("{:#x} {}", l.addr, l.text))
                .collect(),
        }
    }

    fn find_by<F: Fn(&str) -> bool>(&self, pred: F) -> (Vec<SearchHit>, bool) {
        let mut out = Vec::new();
        for (i, line) in self.lines.iter().enumerate() {
            if pred(line) {
                out.push(SearchHit {
                    start: i as u64,
                    len: 1,
                });
                if out.len() >= SEARCH_MATCH_CAP {
                    return (out, true);
                }
            }
        }
        (out, false)
    }
}

impl Haystack for LineHaystack {
    fn len(&self) -> usize {
        self.lines.len()
    }

    fn find(&self, needle: &Needle) -> (Vec<SearchHit>, bool) {
        match needle {
            // Hex needle against a listing: match the normalized hex digit
            // run as a substring of the lowercased line (address or text).
            Needle::Bytes(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
                self.find_by(|line| line.to_lowercase().contains(&hex))
            }
            Needle::Text(text) => {
                let lower = text.to_lowercase();
                self.find_by(|line| line.to_lowercase().contains(&lower))
            }
            Needle::Pattern(re) => self.find_by(|line| re.is_match(line)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{SearchDomain, SearchMode};

    fn mem(bytes: &[u8]) -> MemoryHaystack<'_> {
        MemoryHaystack { base: 0, bytes }
    }

    #[test]
    fn test_memory_hex_and_text_find_same_offsets() {
        // Haystack contains the literal bytes of an ASCII query: text mode
        // and the hex encoding of those bytes must agree.
        let bytes = b"...ABC..ABC.";
        let text = Needle::build("ABC", SearchMode::Text, SearchDomain::Memory).unwrap();
        let hex = Needle::build("41 42 43", SearchMode::Hex, SearchDomain::Memory).unwrap();

        let (text_hits, _) = mem(bytes).find(&text);
        let (hex_hits, _) = mem(bytes).find(&hex);
        assert_eq!(text_hits, hex_hits);
        assert_eq!(text_hits.len(), 2);
        assert_eq!(text_hits[0], SearchHit { start: 3, len: 3 });
        assert_eq!(text_hits[1], SearchHit { start: 8, len: 3 });
    }

    #[test]
    fn test_memory_scan_permits_overlap() {
        let bytes = b"aaaa";
        let needle = Needle::build("aa", SearchMode::Text, SearchDomain::Memory).unwrap();
        let (hits, _) = mem(bytes).find(&needle);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_memory_regex_runs_on_ascii_projection() {
        let bytes = b"\x00\x01USER=root\xff\x02";
        let needle =
            Needle::build("/USER=[a-z]+/", SearchMode::Regex, SearchDomain::Memory).unwrap();
        let (hits, _) = mem(bytes).find(&needle);
        assert_eq!(hits, vec![SearchHit { start: 2, len: 9 }]);

        // Non-printable bytes project to '.', so a dot pattern can cross them
        let needle = Needle::build("/r..t/", SearchMode::Regex, SearchDomain::Memory).unwrap();
        let (hits, _) = mem(b"r\x00\x01t").find(&needle);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_memory_base_offsets_hits() {
        let bytes = b".ABC";
        let hay = MemoryHaystack {
            base: 0x1000,
            bytes,
        };
        let needle = Needle::build("ABC", SearchMode::Text, SearchDomain::Memory).unwrap();
        let (hits, _) = hay.find(&needle);
        assert_eq!(hits, vec![SearchHit { start: 0x1001, len: 3 }]);
    }

    #[test]
    fn test_line_text_case_insensitive() {
        let hay = LineHaystack::from_lines(vec![
            "write(1, \"hi\", 2) = 2".into(),
            "READ(0, buf, 16)".into(),
        ]);
        let needle = Needle::build("read", SearchMode::Text, SearchDomain::SyscallLog).unwrap();
        let (hits, _) = hay.find(&needle);
        assert_eq!(hits, vec![SearchHit { start: 1, len: 1 }]);
    }

    #[test]
    fn test_line_hex_matches_addresses() {
        let lines = vec![
            DisasmLine {
                addr: 0x401000,
                text: "push rbp".into(),
            },
            DisasmLine {
                addr: 0x401004,
                text: "mov eax, 0x4010".into(),
            },
        ];
        let hay = LineHaystack::from_disasm(&lines);
        let needle = Needle::build("4010", SearchMode::Hex, SearchDomain::Disassembly).unwrap();
        let (hits, _) = hay.find(&needle);
        // "4010" appears in both composed lines (address prefix + immediate)
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_line_regex() {
        let hay = LineHaystack::from_lines(vec![
            "0x1 mov rax, rbx".into(),
            "0x2 add rax, 4".into(),
            "0x3 mov r8, rax".into(),
        ]);
        let needle =
            Needle::build("/mov.*rax/", SearchMode::Regex, SearchDomain::Disassembly).unwrap();
        let (hits, _) = hay.find(&needle);
        assert_eq!(
            hits,
            vec![SearchHit { start: 0, len: 1 }, SearchHit { start: 2, len: 1 }]
        );
    }

    #[test]
    fn test_match_cap_sets_overflow() {
        let bytes = vec![0u8; SEARCH_MATCH_CAP + 100];
        let needle = Needle::build("00", SearchMode::Hex, SearchDomain::Memory).unwrap();
        let (hits, overflow) = mem(&bytes).find(&needle);
        assert_eq!(hits.len(), SEARCH_MATCH_CAP);
        assert!(overflow);
    }
}
