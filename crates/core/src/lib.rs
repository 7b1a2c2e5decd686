//! GS1 barcode syntax engine core library.
//!
//! Processes GS1 Application Identifier data in its three interchangeable
//! forms — bracketed AI element strings, unbracketed AI data with `^` as the
//! FNC1 separator, and GS1 Digital Link URIs — and enforces the GS1 General
//! Specifications on their content and structure.  The main entry points are
//! the methods on [`Engine`]: [`Engine::parse_ai_data`],
//! [`Engine::process_ai_data`], [`Engine::parse_dl_uri`] and
//! [`Engine::generate_dl_uri`].

#![warn(missing_docs)]

/// Digital Link URI parsing, generation and key-qualifier association.
pub mod dl;
/// AI element string parsers (bracketed and unbracketed forms).
mod elements;
/// Engine state, configuration and the parsed AI list.
mod engine;
/// Per-component validation: character-set linter then additional linters.
mod lint;
/// Cross-AI validators (mutual exclusion, requisites, repeats, digsig).
mod validate;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Engine
pub use engine::{AiValueView, Engine, Validation, MAX_AIS, MAX_DATA};

// Tables (re-exported from the ai-tables crate)
pub use gs1_syntax_ai_tables::{AiEntry, AiTable, Component, Cset, DlAttr, TableError};

// Errors (re-exported from the diagnostics crate)
pub use gs1_syntax_diagnostics::SyntaxError;

// Linter failure codes (re-exported from the linters crate)
pub use gs1_syntax_linters::LintErr;

/// Serialize a value as pretty-printed JSON.
///
/// Convenience wrapper used to project the parsed AI list (see
/// [`Engine::ai_values`]) for tooling.
pub fn to_pretty_json<T: serde::Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}
