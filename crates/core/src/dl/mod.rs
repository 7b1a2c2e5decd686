//! GS1 Digital Link URI processing.
//!
//! [`keyquals`] derives the set of valid key-qualifier associations from
//! the AI dictionary; [`parse`] decodes a DL URI into the canonical
//! unbracketed form; [`generate`] emits a canonical DL URI from the parsed
//! AIs.

pub(crate) mod escape;
pub(crate) mod generate;
pub(crate) mod keyquals;
pub(crate) mod parse;

/// Stem used for canonical DL URIs when the caller does not supply one.
pub const CANONICAL_STEM: &str = "https://id.gs1.org";
