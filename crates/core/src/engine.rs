//! Engine state: dictionary binding, configuration, the canonical buffer
//! and the parsed AI list.
//!
//! The engine stores a compact representation of AI data (FNC1 in first) in
//! unbracketed form where `^` represents FNC1.  Ingested element strings and
//! Digital Link URI data are parsed into this form, and a list of extracted
//! AIs is kept alongside as spans into the canonical buffer, so only a
//! single copy of the data is held regardless of which input form the
//! caller provided.
//!
//! An engine instance is single-threaded; distinct instances share no
//! mutable state.

use std::sync::Arc;

use gs1_syntax_ai_tables::{AiEntry, AiTable, EntryRef};
use gs1_syntax_diagnostics::SyntaxError;
use serde::Serialize;

use crate::dl::keyquals::KeyQualifiers;
use crate::{dl, elements, validate};

/// Maximum number of extracted AIs per operation.
pub const MAX_AIS: usize = 16;

/// Maximum input length accepted by the parsers, in bytes.
pub const MAX_DATA: usize = 8191;

/// Byte span in the engine's canonical buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }
}

/// One record in the parsed AI list.
#[derive(Debug, Clone)]
pub(crate) enum AiValue {
    /// An extracted AI/value pair.  `ai` and `value` index the canonical
    /// buffer; `dl_path_order` is `Some(position)` for DL URI path
    /// components and `None` for attributes.
    Element {
        /// Handle to the dictionary (or vivified) entry.
        entry: EntryRef,
        /// Span of the AI digits.
        ai: Span,
        /// Span of the value.
        value: Span,
        /// DL URI path position, when assigned.
        dl_path_order: Option<usize>,
    },
    /// A non-AI Digital Link query segment, preserved verbatim.
    DlIgnored {
        /// The raw, undecoded query segment.
        raw: String,
    },
}

/// Read-only view of one extracted AI, resolved against the dictionary.
pub(crate) struct ElementView<'a> {
    /// Position in the parsed AI list.
    pub index: usize,
    /// The dictionary entry (or vivified pseudo-entry).
    pub entry: &'a AiEntry,
    /// The AI digits as they appear in the canonical buffer.
    pub ai: &'a str,
    /// The value text.
    pub value: &'a str,
    /// The canonical buffer from the AI digits onwards; cross-AI constraint
    /// tokens such as `392n` match against this by digit prefix.
    pub stream: &'a str,
    /// DL URI path position, when assigned.
    pub dl_path_order: Option<usize>,
}

/// Projection of one parsed record for callers and JSON dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiValueView<'a> {
    /// The AI digits, or `None` for preserved non-AI query content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai: Option<&'a str>,
    /// The value text (the raw segment for non-AI query content).
    pub value: &'a str,
    /// DL URI path position, when assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dl_path_order: Option<usize>,
}

// ─── Validation toggles ─────────────────────────────────────────────────────

/// Cross-AI validations that run after parsing.
///
/// Locked validations are integral to GS1 conformance and cannot be
/// disabled; the others may be toggled via
/// [`Engine::set_validation_enabled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Mutually exclusive AI pairs (`ex=` attributes).
    MutexAis,
    /// Requisite AI associations (`req=` attributes).
    RequisiteAis,
    /// Repeated AIs must carry identical values.
    RepeatedAis,
    /// Serialised-key AIs must include their serial component alongside a
    /// digital signature (AI 8030).
    DigsigSerialKey,
    /// Whether vivified unknown AIs are rejected as DL URI data attributes.
    /// Consulted by the DL parser and generator rather than run as a
    /// post-parse function.
    UnknownAiNotDlAttr,
}

impl Validation {
    /// All validations, in execution order.
    pub const ALL: [Validation; 5] = [
        Validation::MutexAis,
        Validation::RequisiteAis,
        Validation::RepeatedAis,
        Validation::DigsigSerialKey,
        Validation::UnknownAiNotDlAttr,
    ];
}

#[derive(Debug, Clone, Copy)]
struct ValidationEntry {
    locked: bool,
    enabled: bool,
}

// ─── The engine ─────────────────────────────────────────────────────────────

/// A GS1 syntax engine instance.
///
/// Owns the dictionary binding, the derived key-qualifier index, the
/// canonical data buffer and the parsed AI list.  Each parsing operation
/// replaces the previous contents; on error the buffer and list are cleared
/// so no partial state is observable.
pub struct Engine {
    table: Arc<AiTable>,
    key_qualifiers: KeyQualifiers,

    permit_unknown_ais: bool,
    permit_zero_suppressed_gtin_in_dl_uris: bool,
    include_data_titles_in_hri: bool,
    validations: [(Validation, ValidationEntry); 5],

    pub(crate) data_str: String,
    pub(crate) ai_data: Vec<AiValue>,
}

impl Engine {
    /// Create an engine bound to the embedded default AI dictionary.
    pub fn new() -> Self {
        Self::bind(AiTable::embedded())
    }

    /// Create an engine bound to a caller-supplied dictionary.
    pub fn with_table(table: AiTable) -> Self {
        Self::bind(Arc::new(table))
    }

    fn bind(table: Arc<AiTable>) -> Self {
        let key_qualifiers = KeyQualifiers::from_table(&table);
        //     validation             locked  enabled
        let validations = [
            (Validation::MutexAis, ValidationEntry { locked: true, enabled: true }),
            (Validation::RequisiteAis, ValidationEntry { locked: false, enabled: true }),
            (Validation::RepeatedAis, ValidationEntry { locked: true, enabled: true }),
            (Validation::DigsigSerialKey, ValidationEntry { locked: true, enabled: true }),
            (Validation::UnknownAiNotDlAttr, ValidationEntry { locked: false, enabled: true }),
        ];
        Self {
            table,
            key_qualifiers,
            permit_unknown_ais: false,
            permit_zero_suppressed_gtin_in_dl_uris: false,
            include_data_titles_in_hri: false,
            validations,
            data_str: String::new(),
            ai_data: Vec::new(),
        }
    }

    /// Replace the dictionary binding, rebuilding the key-qualifier index
    /// and discarding any parsed data.
    pub fn set_ai_table(&mut self, table: AiTable) {
        let table = Arc::new(table);
        self.key_qualifiers = KeyQualifiers::from_table(&table);
        self.table = table;
        self.clear();
    }

    /// The bound AI dictionary.
    pub fn table(&self) -> &AiTable {
        &self.table
    }

    pub(crate) fn table_arc(&self) -> Arc<AiTable> {
        self.table.clone()
    }

    pub(crate) fn key_qualifiers(&self) -> &KeyQualifiers {
        &self.key_qualifiers
    }

    // ── Configuration ───────────────────────────────────────────────────

    /// Whether AIs absent from the dictionary are vivified during parsing.
    pub fn permit_unknown_ais(&self) -> bool {
        self.permit_unknown_ais
    }

    /// Permit (or forbid) vivification of unknown AIs.
    pub fn set_permit_unknown_ais(&mut self, permit: bool) {
        self.permit_unknown_ais = permit;
    }

    /// Whether a GTIN-8/12/13 in DL URI path position is zero-padded to 14
    /// digits.
    pub fn permit_zero_suppressed_gtin_in_dl_uris(&self) -> bool {
        self.permit_zero_suppressed_gtin_in_dl_uris
    }

    /// Permit (or forbid) zero-suppressed GTINs in DL URI path position.
    pub fn set_permit_zero_suppressed_gtin_in_dl_uris(&mut self, permit: bool) {
        self.permit_zero_suppressed_gtin_in_dl_uris = permit;
    }

    /// Whether HRI output includes the AI data titles.
    pub fn include_data_titles_in_hri(&self) -> bool {
        self.include_data_titles_in_hri
    }

    /// Include (or omit) data titles in HRI output.
    pub fn set_include_data_titles_in_hri(&mut self, include: bool) {
        self.include_data_titles_in_hri = include;
    }

    /// Whether the given validation is enabled.
    pub fn validation_enabled(&self, validation: Validation) -> bool {
        self.validations
            .iter()
            .find(|(v, _)| *v == validation)
            .map(|(_, e)| e.enabled)
            .unwrap_or(false)
    }

    /// Whether the given validation is locked against toggling.
    pub fn validation_locked(&self, validation: Validation) -> bool {
        self.validations
            .iter()
            .find(|(v, _)| *v == validation)
            .map(|(_, e)| e.locked)
            .unwrap_or(false)
    }

    /// Enable or disable a validation.  Locked validations cannot be
    /// toggled.
    pub fn set_validation_enabled(
        &mut self,
        validation: Validation,
        enabled: bool,
    ) -> Result<(), SyntaxError> {
        let entry = self
            .validations
            .iter_mut()
            .find(|(v, _)| *v == validation)
            .map(|(_, e)| e)
            .expect("validation table covers all variants");
        if entry.locked {
            return Err(SyntaxError::ValidationLocked);
        }
        entry.enabled = enabled;
        Ok(())
    }

    // ── Operations ──────────────────────────────────────────────────────

    /// Parse a bracketed AI element string such as
    /// `(01)12345678901231(10)ABC123` into the canonical unbracketed form,
    /// returning the canonical string.
    pub fn parse_ai_data(&mut self, ai_data: &str) -> Result<&str, SyntaxError> {
        self.clear();
        if let Err(e) = self.parse_ai_data_inner(ai_data) {
            self.clear();
            return Err(e);
        }
        Ok(&self.data_str)
    }

    fn parse_ai_data_inner(&mut self, ai_data: &str) -> Result<(), SyntaxError> {
        if ai_data.len() > MAX_DATA {
            return Err(SyntaxError::DataTooLong { max: MAX_DATA });
        }
        elements::parse_bracketed(self, ai_data)?;
        elements::process(self, false)?;
        validate::run(self)
    }

    /// Validate an unbracketed AI data string (`^` = FNC1), extracting the
    /// AIs into the engine.
    pub fn process_ai_data(&mut self, data: &str) -> Result<(), SyntaxError> {
        self.clear();
        if let Err(e) = self.process_ai_data_inner(data) {
            self.clear();
            return Err(e);
        }
        Ok(())
    }

    fn process_ai_data_inner(&mut self, data: &str) -> Result<(), SyntaxError> {
        if data.len() > MAX_DATA {
            return Err(SyntaxError::DataTooLong { max: MAX_DATA });
        }
        self.data_str = data.to_owned();
        elements::process(self, true)?;
        validate::run(self)
    }

    /// Parse a GS1 Digital Link URI into the canonical unbracketed form,
    /// validating the key-qualifier associations in the path information,
    /// and return the canonical string.
    pub fn parse_dl_uri(&mut self, uri: &str) -> Result<&str, SyntaxError> {
        self.clear();
        if let Err(e) = self.parse_dl_uri_inner(uri) {
            self.clear();
            return Err(e);
        }
        Ok(&self.data_str)
    }

    fn parse_dl_uri_inner(&mut self, uri: &str) -> Result<(), SyntaxError> {
        if uri.len() > MAX_DATA {
            return Err(SyntaxError::DataTooLong { max: MAX_DATA });
        }
        dl::parse::parse(self, uri)?;
        elements::process(self, false)?;
        validate::run(self)
    }

    /// Generate a canonical DL URI from the parsed AIs under `stem`
    /// (default `https://id.gs1.org`).
    ///
    /// The parsed data is retained on failure.
    pub fn generate_dl_uri(&mut self, stem: Option<&str>) -> Result<String, SyntaxError> {
        dl::generate::generate(self, stem)
    }

    // ── Projections ─────────────────────────────────────────────────────

    /// The canonical unbracketed AI data from the last successful parse.
    pub fn data_str(&self) -> &str {
        &self.data_str
    }

    /// The parsed AI list.
    pub fn ai_values(&self) -> Vec<AiValueView<'_>> {
        self.ai_data
            .iter()
            .map(|rec| match rec {
                AiValue::Element {
                    ai,
                    value,
                    dl_path_order,
                    ..
                } => AiValueView {
                    ai: Some(&self.data_str[ai.start..ai.end]),
                    value: &self.data_str[value.start..value.end],
                    dl_path_order: *dl_path_order,
                },
                AiValue::DlIgnored { raw } => AiValueView {
                    ai: None,
                    value: raw,
                    dl_path_order: None,
                },
            })
            .collect()
    }

    /// Render the parsed AIs as a bracketed element string; `(` within
    /// values is escaped as `\(`.
    pub fn ai_data_str(&self) -> String {
        let mut out = String::new();
        for el in self.elements() {
            out.push('(');
            out.push_str(el.ai);
            out.push(')');
            if el.value.contains('(') {
                out.push_str(&el.value.replace('(', "\\("));
            } else {
                out.push_str(el.value);
            }
        }
        out
    }

    /// HRI-style rendering of the parsed AIs, one line per AI, optionally
    /// prefixed with the dictionary data titles.
    pub fn hri(&self) -> Vec<String> {
        self.elements()
            .iter()
            .map(|el| {
                if self.include_data_titles_in_hri && !el.entry.title.is_empty() {
                    format!("{} ({}) {}", el.entry.title, el.ai, el.value)
                } else {
                    format!("({}) {}", el.ai, el.value)
                }
            })
            .collect()
    }

    /// Non-AI query segments preserved from the last DL URI parse.
    pub fn dl_ignored_query_params(&self) -> Vec<&str> {
        self.ai_data
            .iter()
            .filter_map(|rec| match rec {
                AiValue::DlIgnored { raw } => Some(raw.as_str()),
                _ => None,
            })
            .collect()
    }

    // ── Internal helpers ────────────────────────────────────────────────

    pub(crate) fn clear(&mut self) {
        self.data_str.clear();
        self.ai_data.clear();
    }

    /// Resolve the extracted AI records against the dictionary.
    pub(crate) fn elements(&self) -> Vec<ElementView<'_>> {
        self.ai_data
            .iter()
            .enumerate()
            .filter_map(|(index, rec)| match rec {
                AiValue::Element {
                    entry,
                    ai,
                    value,
                    dl_path_order,
                } => Some(ElementView {
                    index,
                    entry: self.table.entry(*entry),
                    ai: &self.data_str[ai.start..ai.end],
                    value: &self.data_str[value.start..value.end],
                    stream: &self.data_str[ai.start..],
                    dl_path_order: *dl_path_order,
                }),
                AiValue::DlIgnored { .. } => None,
            })
            .collect()
    }

    pub(crate) fn set_dl_path_order(&mut self, index: usize, order: Option<usize>) {
        if let AiValue::Element { dl_path_order, .. } = &mut self.ai_data[index] {
            *dl_path_order = order;
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
