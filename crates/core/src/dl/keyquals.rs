//! Key-qualifier association index.
//!
//! Built from the `dlpkey` attributes of the AI dictionary: every valid
//! `key [qualifier…]` sequence is stored as a space-joined string in a
//! sorted list, making both membership tests and "would inserting this AI
//! here form a valid path" trials a binary search.

use gs1_syntax_ai_tables::AiTable;

/// The sorted list of valid key-qualifier sequences.
#[derive(Debug, Clone)]
pub(crate) struct KeyQualifiers {
    seqs: Vec<String>,
}

impl KeyQualifiers {
    /// Derive the index from the `dlpkey` attributes of `table`.
    ///
    /// A bare `dlpkey` contributes just the key.  `dlpkey=Q1,Q2|Q3` names
    /// alternative qualifier chains separated by `|`; for each chain, every
    /// order-preserving choice of its qualifiers is a valid continuation,
    /// so a chain of `n` qualifiers contributes `2^n` sequences.
    pub fn from_table(table: &AiTable) -> Self {
        let mut seqs = Vec::new();
        for entry in table.entries() {
            for token in entry.attr_tokens() {
                if token == "dlpkey" {
                    add_key_qualifiers(&mut seqs, &entry.ai, "");
                } else if let Some(spec) = token.strip_prefix("dlpkey=") {
                    for chain in spec.split('|') {
                        add_key_qualifiers(&mut seqs, &entry.ai, chain);
                    }
                }
            }
        }
        seqs.sort();
        Self { seqs }
    }

    /// Whether `seq` (space-joined AIs) is a valid key-qualifier sequence.
    pub fn contains(&self, seq: &str) -> bool {
        self.position(seq).is_some()
    }

    /// Position of `seq` in the sorted index.
    pub fn position(&self, seq: &str) -> Option<usize> {
        self.seqs
            .binary_search_by(|probe| probe.as_str().cmp(seq))
            .ok()
    }

    /// The sorted sequences.
    pub fn seqs(&self) -> &[String] {
        &self.seqs
    }
}

/// Append every order-preserving choice from `chain` (comma-separated
/// qualifiers) to `key`, doubling the block of sequences added so far for
/// each successive qualifier.
fn add_key_qualifiers(seqs: &mut Vec<String>, key: &str, chain: &str) {
    let base = seqs.len();
    seqs.push(key.to_string());
    if chain.is_empty() {
        return;
    }
    for qualifier in chain.split(',') {
        let count = seqs.len() - base;
        for k in 0..count {
            seqs.push(format!("{} {}", seqs[base + k], qualifier));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs1_syntax_ai_tables::AiTable;

    fn index() -> KeyQualifiers {
        KeyQualifiers::from_table(&AiTable::embedded())
    }

    #[test]
    fn index_is_sorted() {
        let kq = index();
        for w in kq.seqs().windows(2) {
            assert!(w[0] <= w[1], "{} > {}", w[0], w[1]);
        }
    }

    #[test]
    fn all_reference_sequences_are_members() {
        let kq = index();
        let sequences: &[&str] = &[
            "00",
            "01",
            "01 21",
            "01 10",
            "01 10 21",
            "01 22",
            "01 22 21",
            "01 22 10",
            "01 22 10 21",
            "01 235",
            "253",
            "255",
            "401",
            "402",
            "414",
            "414 254",
            "414 7040",
            "417",
            "417 7040",
            "8003",
            "8004",
            "8004 7040",
            "8006",
            "8006 21",
            "8006 10",
            "8006 10 21",
            "8006 22",
            "8006 22 21",
            "8006 22 10",
            "8006 22 10 21",
            "8010",
            "8010 8011",
            "8013",
            "8017",
            "8017 8019",
            "8018",
            "8018 8019",
        ];
        for seq in sequences {
            assert!(kq.contains(seq), "expected member: {seq}");
        }
    }

    #[test]
    fn non_sequences_are_rejected() {
        let kq = index();
        for seq in ["10", "21", "01 10 22", "01 21 10", "22 01", "01 7040", ""] {
            assert!(!kq.contains(seq), "unexpected member: {seq}");
        }
    }

    #[test]
    fn chain_enumeration_is_powerset_of_prefix_choices() {
        let mut seqs = Vec::new();
        add_key_qualifiers(&mut seqs, "01", "22,10,21");
        assert_eq!(seqs.len(), 8); // 2^3
        assert!(seqs.contains(&"01".to_string()));
        assert!(seqs.contains(&"01 22 10 21".to_string()));
        assert!(seqs.contains(&"01 10 21".to_string()));
        assert!(!seqs.contains(&"01 21 10".to_string()));
    }
}
