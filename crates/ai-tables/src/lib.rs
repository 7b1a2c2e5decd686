//! GS1 Application Identifier dictionary tables.
//!
//! Defines the data model for AI dictionary entries (component schemas,
//! FNC1 requirement, Digital Link attribute class, cross-AI constraint
//! attributes), the Syntax-Dictionary text parser used to populate it, and
//! the prefix-indexed lookup with unknown-AI vivification.  The embedded
//! default dictionary is available through [`AiTable::embedded`].
//!
//! Tables are immutable once built: [`AiTable::from_entries`] validates and
//! sorts the entries, derives the two-digit-prefix length table, and the
//! result is then only read.

#![warn(missing_docs)]

use std::cmp::Ordering;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

mod syntax;

/// Minimum number of digits in an AI code.
pub const MIN_AI_LEN: usize = 2;
/// Maximum number of digits in an AI code.
pub const MAX_AI_LEN: usize = 4;

/// Marker for a variable-length value in the fixed-length prefix table.
const VL: u8 = 0;

/// Value lengths of AI prefixes that are predefined as fixed-length and do
/// not require FNC1 termination.  Indexed by two-digit prefix.  Consulted
/// only when vivifying an unknown AI, since not all prefixes are in use.
const FIXED_VALUE_LENGTH_BY_PREFIX: [u8; 100] = [
    18, 14, 14, 14, 16, // (00) - (04)
    VL, VL, VL, VL, VL, VL, //
    6, 6, 6, 6, 6, 6, 6, 6, 6, 2, // (11) - (20)
    VL, VL, //
    VL, // (23) no longer fixed length, now (235) allocated as TPX
    VL, VL, VL, VL, VL, VL, VL, //
    6, 6, 6, 6, 6, 6, // (31) - (36)
    VL, VL, VL, VL, //
    13, // (41)
    VL, VL, VL, VL, VL, VL, VL, VL, //
    VL, VL, VL, VL, VL, VL, VL, VL, VL, VL, //
    VL, VL, VL, VL, VL, VL, VL, VL, VL, VL, //
    VL, VL, VL, VL, VL, VL, VL, VL, VL, VL, //
    VL, VL, VL, VL, VL, VL, VL, VL, VL, VL, //
    VL, VL, VL, VL, VL, VL, VL, VL, VL, VL,
];

// ─── Data model ─────────────────────────────────────────────────────────────

/// GS1 character set of a value component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cset {
    /// Numeric digits.
    N,
    /// CSET 82 (file-safe alphanumeric and punctuation).
    X,
    /// CSET 39 (reduced alphanumeric).
    Y,
    /// CSET 64 (URL-safe base64).
    Z,
}

impl Cset {
    /// The character-set linter that polices this set.
    pub fn linter(self) -> gs1_syntax_linters::Linter {
        match self {
            Cset::N => gs1_syntax_linters::cset_numeric,
            Cset::X => gs1_syntax_linters::cset82,
            Cset::Y => gs1_syntax_linters::cset39,
            Cset::Z => gs1_syntax_linters::cset64,
        }
    }
}

/// Digital Link data-attribute class of an AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DlAttr {
    /// The AI may not appear as a DL URI query attribute.
    None,
    /// The AI is a permitted DL URI query attribute.
    Permitted,
    /// The AI was vivified; permissibility is governed by the
    /// `UNKNOWN_AI_NOT_DL_ATTR` validation toggle.
    Unknown,
}

/// One component of an AI's value schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Character set of this component.
    pub cset: Cset,
    /// Minimum length.
    pub min: usize,
    /// Maximum length.
    pub max: usize,
    /// Whether the component may be absent entirely.
    #[serde(default)]
    pub optional: bool,
    /// Additional linters applied after the character-set linter.
    #[serde(default)]
    pub linters: Vec<String>,
}

/// One AI dictionary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiEntry {
    /// The AI code (2-4 digits; empty for the generic unknown pseudo-entry).
    pub ai: String,
    /// Whether this AI's value must be terminated by FNC1 (or end of data).
    #[serde(default = "default_true")]
    pub fnc1: bool,
    /// Digital Link data-attribute class.
    #[serde(default = "default_dl_attr")]
    pub dl_attr: DlAttr,
    /// Ordered value components.
    pub components: Vec<Component>,
    /// Space-separated attribute tokens (`dlpkey=22,10,21|235`, `ex=…`,
    /// `req=…`), tokenised at point of use.
    #[serde(default)]
    pub attrs: String,
    /// Data title used for HRI rendering.
    #[serde(default)]
    pub title: String,
}

fn default_true() -> bool {
    true
}

fn default_dl_attr() -> DlAttr {
    DlAttr::None
}

impl AiEntry {
    /// Overall minimum value length: the sum of the mandatory components'
    /// minima.
    pub fn min_length(&self) -> usize {
        self.components
            .iter()
            .filter(|c| !c.optional)
            .map(|c| c.min)
            .sum()
    }

    /// Overall maximum value length: the sum of all components' maxima.
    pub fn max_length(&self) -> usize {
        self.components.iter().map(|c| c.max).sum()
    }

    /// Iterate the space-separated attribute tokens.
    pub fn attr_tokens(&self) -> impl Iterator<Item = &str> {
        self.attrs.split_ascii_whitespace()
    }
}

// ─── Errors ─────────────────────────────────────────────────────────────────

/// Failures when building or parsing an AI table.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Two AIs sharing a two-digit prefix have different code lengths.
    #[error("AIs with prefix {prefix} differ in length")]
    PrefixLengthMismatch {
        /// The offending two-digit prefix.
        prefix: String,
    },

    /// An entry is structurally invalid.
    #[error("invalid AI entry ({ai}): {msg}")]
    InvalidEntry {
        /// The AI code of the offending entry.
        ai: String,
        /// What is wrong with it.
        msg: String,
    },

    /// A Syntax Dictionary line could not be parsed.
    #[error("syntax dictionary line {line}: {msg}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What is wrong with the line.
        msg: String,
    },
}

// ─── Entry references ───────────────────────────────────────────────────────

// Indexes into the vivified pseudo-entry set.
const UNKNOWN: usize = 0;
const UNKNOWN2: usize = 1;
const UNKNOWN3: usize = 2;
const UNKNOWN4: usize = 3;
const UNKNOWN2_FIXED2: usize = 4;
const UNKNOWN2_FIXED14: usize = 5;
const UNKNOWN2_FIXED16: usize = 6;
const UNKNOWN2_FIXED18: usize = 7;
const UNKNOWN3_FIXED13: usize = 8;
const UNKNOWN4_FIXED6: usize = 9;

/// A copyable handle to an AI entry, resolvable through [`AiTable::entry`].
///
/// Parsed AI records hold these instead of borrowed references so the
/// engine's ownership stays a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRef {
    /// Index into the table's sorted entry list.
    Dict(usize),
    /// One of the vivified pseudo-entries for unknown AIs.
    Unknown(usize),
}

impl EntryRef {
    /// Whether this reference is to any vivified pseudo-entry.
    pub fn is_unknown(self) -> bool {
        matches!(self, EntryRef::Unknown(_))
    }

    /// Whether this is the generic unknown pseudo-entry, whose AI length is
    /// indeterminate.
    pub fn is_generic_unknown(self) -> bool {
        matches!(self, EntryRef::Unknown(UNKNOWN))
    }
}

fn unknown_entry(ai: &str, fnc1: bool, min: usize, max: usize) -> AiEntry {
    AiEntry {
        ai: ai.into(),
        fnc1,
        dl_attr: DlAttr::Unknown,
        components: vec![Component {
            cset: Cset::X,
            min,
            max,
            optional: false,
            linters: Vec::new(),
        }],
        attrs: String::new(),
        title: "UNKNOWN".into(),
    }
}

/// Pseudo-entries returned when vivifying AIs absent from the table.  The
/// `XX` placeholder codes carry the vivified AI length; fixed-length
/// variants match the predefined prefix value lengths.
fn unknown_entries() -> &'static [AiEntry] {
    static ENTRIES: OnceLock<Vec<AiEntry>> = OnceLock::new();
    ENTRIES.get_or_init(|| {
        vec![
            unknown_entry("", true, 1, 90),
            unknown_entry("XX", true, 1, 90),
            unknown_entry("XXX", true, 1, 90),
            unknown_entry("XXXX", true, 1, 90),
            unknown_entry("XX", false, 2, 2),
            unknown_entry("XX", false, 14, 14),
            unknown_entry("XX", false, 16, 16),
            unknown_entry("XX", false, 18, 18),
            unknown_entry("XXX", false, 13, 13),
            unknown_entry("XXXX", false, 6, 6),
        ]
    })
}

// ─── The table ──────────────────────────────────────────────────────────────

/// An immutable, sorted AI dictionary with its derived prefix-length table.
#[derive(Debug, Clone)]
pub struct AiTable {
    /// Entries sorted lexicographically by AI code.
    entries: Vec<AiEntry>,
    /// AI code length by two-digit prefix; 0 when the prefix is unused.
    length_by_prefix: [u8; 100],
}

/// First `n` bytes of `s` exist and are ASCII digits.
fn all_digits(s: &str, n: usize) -> bool {
    s.len() >= n && s.as_bytes()[..n].iter().all(u8::is_ascii_digit)
}

/// `strncmp(code, data, code.len())`: compare `data` against `code` as a
/// prefix, treating the end of `data` as smaller than any code byte.
fn cmp_as_prefix(code: &[u8], data: &[u8]) -> Ordering {
    for (i, &c) in code.iter().enumerate() {
        match data.get(i) {
            None => return Ordering::Greater,
            Some(&d) if c != d => return c.cmp(&d),
            Some(_) => {}
        }
    }
    Ordering::Equal
}

impl AiTable {
    /// Build a table from entries, validating structure and deriving the
    /// prefix-length table.  All AIs sharing a two-digit prefix must have
    /// the same code length.
    pub fn from_entries(mut entries: Vec<AiEntry>) -> Result<Self, TableError> {
        for entry in &entries {
            Self::validate_entry(entry)?;
        }
        entries.sort_by(|a, b| a.ai.cmp(&b.ai));

        let mut length_by_prefix = [0u8; 100];
        for entry in &entries {
            let b = entry.ai.as_bytes();
            let prefix = usize::from(b[0] - b'0') * 10 + usize::from(b[1] - b'0');
            let len = entry.ai.len() as u8;
            if length_by_prefix[prefix] != 0 && length_by_prefix[prefix] != len {
                return Err(TableError::PrefixLengthMismatch {
                    prefix: entry.ai[..2].into(),
                });
            }
            length_by_prefix[prefix] = len;
        }

        Ok(Self {
            entries,
            length_by_prefix,
        })
    }

    fn validate_entry(entry: &AiEntry) -> Result<(), TableError> {
        let err = |msg: String| {
            Err(TableError::InvalidEntry {
                ai: entry.ai.clone(),
                msg,
            })
        };

        if !(MIN_AI_LEN..=MAX_AI_LEN).contains(&entry.ai.len())
            || !all_digits(&entry.ai, entry.ai.len())
        {
            return err("AI must be 2-4 digits".into());
        }
        if entry.components.is_empty() {
            return err("AI is missing components".into());
        }
        for (i, c) in entry.components.iter().enumerate() {
            if c.min == 0 || c.min > c.max {
                return err("component lengths must satisfy 1 <= min <= max".into());
            }
            if i + 1 < entry.components.len() && c.min != c.max {
                return err("only the final component may have variable length".into());
            }
            if !c.optional && i > 0 && entry.components[i - 1].optional {
                return err("a mandatory component cannot follow optional components".into());
            }
            for name in &c.linters {
                if gs1_syntax_linters::linter_from_name(name).is_none() {
                    return err(format!("unknown linter '{name}'"));
                }
            }
        }
        Ok(())
    }

    /// Parse a table from Syntax Dictionary text (see `data/ai-dictionary.txt`
    /// for the format).  No file I/O is performed; the caller supplies the
    /// text.
    pub fn parse_syntax_dictionary(text: &str) -> Result<Self, TableError> {
        Self::from_entries(syntax::parse(text)?)
    }

    /// The embedded default dictionary.
    pub fn embedded() -> Arc<AiTable> {
        static EMBEDDED: OnceLock<Arc<AiTable>> = OnceLock::new();
        EMBEDDED
            .get_or_init(|| {
                let text = include_str!("../data/ai-dictionary.txt");
                Arc::new(
                    AiTable::parse_syntax_dictionary(text)
                        .expect("embedded AI dictionary must be valid"),
                )
            })
            .clone()
    }

    /// The sorted dictionary entries.
    pub fn entries(&self) -> &[AiEntry] {
        &self.entries
    }

    /// Resolve an [`EntryRef`] produced by [`AiTable::lookup`].
    pub fn entry(&self, r: EntryRef) -> &AiEntry {
        match r {
            EntryRef::Dict(i) => &self.entries[i],
            EntryRef::Unknown(i) => &unknown_entries()[i],
        }
    }

    /// AI code length for the two-digit prefix of `ai`, or 0 when unused.
    ///
    /// The first two bytes of `ai` must be digits.
    pub fn length_by_prefix(&self, ai: &str) -> u8 {
        let b = ai.as_bytes();
        debug_assert!(all_digits(ai, 2));
        self.length_by_prefix[usize::from(b[0] - b'0') * 10 + usize::from(b[1] - b'0')]
    }

    /// Look up the AI entry matching `data`.
    ///
    /// With `exact_len != 0` the AI must have exactly that length; with
    /// `exact_len == 0` any dictionary AI matching a prefix of `data` is
    /// returned.  When `permit_unknown` is set and no dictionary entry
    /// matches, a pseudo-entry is vivified provided the prefix-length table
    /// does not contradict the requested length; AIs that are prefixes of
    /// known AIs are never vivified.
    pub fn lookup(
        &self,
        data: &str,
        exact_len: usize,
        permit_unknown: bool,
    ) -> Option<(EntryRef, &AiEntry)> {
        debug_assert!(exact_len == 0 || exact_len <= data.len());

        if exact_len != 0 && !(MIN_AI_LEN..=MAX_AI_LEN).contains(&exact_len) {
            return None;
        }

        // Don't attempt to find a non-digit AI.
        let digits = if exact_len != 0 { exact_len } else { MIN_AI_LEN };
        if !all_digits(data, digits) {
            return None;
        }

        let b = data.as_bytes();
        let (mut s, mut e) = (0usize, self.entries.len());
        while s < e {
            let m = s + (e - s) / 2;
            let entry = &self.entries[m];
            let code = entry.ai.as_bytes();
            let cmp = cmp_as_prefix(code, b);
            if cmp == Ordering::Equal {
                if exact_len != 0 && code.len() != exact_len {
                    return None; // prefix match, but incorrect length
                }
                return Some((EntryRef::Dict(m), entry));
            }
            // Don't vivify an AI that is a prefix of a known AI.
            if exact_len != 0 && code.len() >= exact_len && code[..exact_len] == b[..exact_len] {
                return None;
            }
            if cmp == Ordering::Less {
                s = m + 1;
            } else {
                e = m;
            }
        }

        if !permit_unknown {
            return None;
        }

        // Vivify, but only if the length agrees with the prefix table where
        // such a length is defined.
        let prefix_len = usize::from(self.length_by_prefix(data));
        if exact_len != 0 && prefix_len != 0 && prefix_len != exact_len {
            return None;
        }
        if prefix_len != 0 && !all_digits(data, prefix_len) {
            return None;
        }

        let prefix = usize::from(b[0] - b'0') * 10 + usize::from(b[1] - b'0');
        let fixed = FIXED_VALUE_LENGTH_BY_PREFIX[prefix];
        let idx = match (prefix_len, fixed) {
            (2, VL) => UNKNOWN2,
            (2, 2) => UNKNOWN2_FIXED2,
            (2, 14) => UNKNOWN2_FIXED14,
            (2, 16) => UNKNOWN2_FIXED16,
            (2, 18) => UNKNOWN2_FIXED18,
            (3, VL) => UNKNOWN3,
            (3, 13) => UNKNOWN3_FIXED13,
            (4, VL) => UNKNOWN4,
            (4, 6) => UNKNOWN4_FIXED6,
            _ => UNKNOWN, // unknown AI length
        };
        Some((EntryRef::Unknown(idx), &unknown_entries()[idx]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Arc<AiTable> {
        AiTable::embedded()
    }

    #[test]
    fn embedded_table_loads() {
        let t = table();
        assert!(!t.entries().is_empty());
        for w in t.entries().windows(2) {
            assert!(w[0].ai < w[1].ai, "{} >= {}", w[0].ai, w[1].ai);
        }
    }

    #[test]
    fn lookup_exact_and_prefix() {
        let t = table();
        assert_eq!(t.lookup("01", 2, false).unwrap().1.ai, "01");
        assert_eq!(t.lookup("011234", 2, false).unwrap().1.ai, "01");
        assert_eq!(t.lookup("011234", 0, false).unwrap().1.ai, "01");
        assert_eq!(t.lookup("8013", 0, false).unwrap().1.ai, "8013");
        assert_eq!(t.lookup("235XXX", 0, false).unwrap().1.ai, "235");
    }

    #[test]
    fn lookup_rejects_unknown_and_partial() {
        let t = table();
        assert!(t.lookup("2345XX", 4, false).is_none());
        assert!(t.lookup("234XXX", 3, false).is_none());
        assert!(t.lookup("23XXXX", 2, false).is_none());
        assert!(t.lookup("XXXXXX", 0, false).is_none());
        assert!(t.lookup("234567", 0, false).is_none());
        // No such AI (23), even though data starts 235.
        assert!(t.lookup("235XXX", 2, false).is_none());
        // No such AI (371), even though there is AI (37).
        assert_eq!(t.lookup("37123", 2, false).unwrap().1.ai, "37");
        assert!(t.lookup("37123", 3, false).is_none());
        assert!(t.lookup("37123", 1, false).is_none());
    }

    #[test]
    fn vivification_respects_prefix_lengths() {
        let t = table();

        // (89) has no prefix entry: generic unknown, FNC1 required.
        let (r, e) = t.lookup("89", 2, true).unwrap();
        assert!(r.is_generic_unknown());
        assert!(e.fnc1);

        // (011) cannot be vivified: known (01) is a prefix match.
        assert!(t.lookup("011", 3, true).is_none());
        // (8001) exists; don't vivify (800) or (80).
        assert!(t.lookup("800", 3, true).is_none());
        assert!(t.lookup("80", 2, true).is_none());

        // Prefix 39 is length 4, so (399) is invalid but (3999) vivifies.
        assert!(t.lookup("399", 3, true).is_none());
        let (r, e) = t.lookup("3999", 4, true).unwrap();
        assert_eq!((r.is_unknown(), e.ai.len(), e.fnc1), (true, 4, true));

        // Prefix 23 is length 3, so (2367) is invalid but (236) vivifies.
        assert!(t.lookup("2367", 4, true).is_none());
        let (_, e) = t.lookup("236", 3, true).unwrap();
        assert_eq!((e.ai.len(), e.fnc1), (3, true));

        // Prefix 41 is length 3 with fixed value length 13.
        assert!(t.lookup("4199", 4, true).is_none());
        let (_, e) = t.lookup("419", 3, true).unwrap();
        assert_eq!((e.ai.len(), e.fnc1, e.min_length()), (3, false, 13));
    }

    #[test]
    fn prefix_length_table_matches_entries() {
        let t = table();
        for entry in t.entries() {
            assert_eq!(
                t.length_by_prefix(&entry.ai) as usize,
                entry.ai.len(),
                "prefix table disagrees for {}",
                entry.ai
            );
        }
    }

    #[test]
    fn fnc1_matches_fixed_prefix_table() {
        // The table's FNC1 flags and the static fixed-length prefix list
        // must agree, otherwise vivification invents inconsistent entries.
        let t = table();
        for entry in t.entries() {
            let b = entry.ai.as_bytes();
            let prefix = usize::from(b[0] - b'0') * 10 + usize::from(b[1] - b'0');
            assert_eq!(
                entry.fnc1,
                FIXED_VALUE_LENGTH_BY_PREFIX[prefix] == VL,
                "FNC1 flag disagrees for {}",
                entry.ai
            );
        }
    }

    #[test]
    fn conflicting_prefix_lengths_rejected() {
        let mk = |ai: &str| AiEntry {
            ai: ai.into(),
            fnc1: true,
            dl_attr: DlAttr::Permitted,
            components: vec![Component {
                cset: Cset::X,
                min: 1,
                max: 30,
                optional: false,
                linters: Vec::new(),
            }],
            attrs: String::new(),
            title: String::new(),
        };
        let err = AiTable::from_entries(vec![mk("90"), mk("901")]).unwrap_err();
        assert_eq!(
            err,
            TableError::PrefixLengthMismatch {
                prefix: "90".into()
            }
        );
    }

    #[test]
    fn entries_deserialize_from_json() {
        let json = r#"[{
            "ai": "95",
            "fnc1": true,
            "dlAttr": "permitted",
            "components": [
                { "cset": "X", "min": 1, "max": 30, "linters": [] }
            ],
            "attrs": "",
            "title": "INTERNAL"
        }]"#;
        let entries: Vec<AiEntry> = serde_json::from_str(json).unwrap();
        let t = AiTable::from_entries(entries).unwrap();
        assert_eq!(t.lookup("95", 2, false).unwrap().1.title, "INTERNAL");
    }

    #[test]
    fn unknown_linter_name_rejected() {
        let entry = AiEntry {
            ai: "95".into(),
            fnc1: true,
            dl_attr: DlAttr::Permitted,
            components: vec![Component {
                cset: Cset::X,
                min: 1,
                max: 30,
                optional: false,
                linters: vec!["nosuchlinter".into()],
            }],
            attrs: String::new(),
            title: String::new(),
        };
        assert!(matches!(
            AiTable::from_entries(vec![entry]),
            Err(TableError::InvalidEntry { .. })
        ));
    }
}
