//! GS1 Digital Link URI generator.
//!
//! Chooses the best key-qualifier sequence for the parsed AIs and emits a
//! canonical DL URI: qualifiers in path order, remaining AIs as query
//! attributes with fixed-length AIs emitted first.

use gs1_syntax_ai_tables::DlAttr;
use gs1_syntax_diagnostics::SyntaxError;

use crate::dl::escape::uri_escape;
use crate::dl::CANONICAL_STEM;
use crate::engine::{Engine, Validation};

struct Element {
    index: usize,
    code: String,
    value: String,
    fnc1: bool,
    dl_attr: DlAttr,
    order: Option<usize>,
}

/// Generate a DL URI from the engine's parsed AIs under `stem`.
pub(crate) fn generate(engine: &mut Engine, stem: Option<&str>) -> Result<String, SyntaxError> {
    let mut els: Vec<Element> = engine
        .elements()
        .iter()
        .map(|el| Element {
            index: el.index,
            code: el.ai.to_string(),
            value: el.value.to_string(),
            fnc1: el.entry.fnc1,
            dl_attr: el.entry.dl_attr,
            order: None,
        })
        .collect();

    // Select the first AI that is a valid primary key for a DL URI.
    let kq = engine.key_qualifiers();
    let (key_entry, key) = els
        .iter()
        .find_map(|el| kq.position(&el.code).map(|pos| (pos, el.code.clone())))
        .ok_or(SyntaxError::CannotCreateDlUriWithoutPrimaryKeyAi)?;

    // Pick the sequence starting with the chosen key that has the maximum
    // number of matching qualifier AIs; ties go to the first in the sorted
    // index.
    let seqs = kq.seqs();
    let mut best = key_entry;
    let mut max_qualifiers = 0;
    for idx in key_entry + 1..seqs.len() {
        let mut tokens = seqs[idx].split(' ');
        if tokens.next() != Some(key.as_str()) {
            break;
        }
        let matches: usize = tokens
            .map(|token| els.iter().filter(|el| el.code == token).count())
            .sum();
        if matches > max_qualifiers {
            max_qualifiers = matches;
            best = idx;
        }
    }
    let chosen: Vec<String> = seqs[best].split(' ').map(String::from).collect();

    // Apply the path order from the chosen sequence to the AI elements.
    for (order, token) in chosen.iter().enumerate() {
        for el in &mut els {
            if el.code == *token {
                el.order = Some(order);
            }
        }
    }
    for el in &els {
        engine.set_dl_path_order(el.index, el.order);
    }

    // Emit the path components in sequence order, one element per
    // position (duplicates carry equal values, so the first suffices).
    let mut out = stem.unwrap_or(CANONICAL_STEM).to_string();
    if out.ends_with('/') {
        out.pop();
    }
    for order in 0..chosen.len() {
        if let Some(el) = els.iter().find(|el| el.order == Some(order)) {
            out.push('/');
            out.push_str(&el.code);
            out.push('/');
            out.push_str(&uri_escape(&el.value, false));
        }
    }

    // Emit the attribute AIs in received order, fixed-length first so that
    // downstream consumers concatenating the query string keep a stable
    // prefix.
    out.push('?');
    for emit_fixed in [true, false] {
        for (n, el) in els.iter().enumerate() {
            if el.order.is_some() || el.fnc1 == emit_fixed {
                continue;
            }
            // Skip duplicate AIs that have already been emitted.
            let duplicate = els[..n]
                .iter()
                .any(|prior| prior.fnc1 == el.fnc1 && prior.code == el.code);
            if duplicate {
                continue;
            }

            let unknown_forbidden = engine.validation_enabled(Validation::UnknownAiNotDlAttr);
            match el.dl_attr {
                DlAttr::Permitted => {}
                DlAttr::Unknown if !unknown_forbidden => {}
                _ => {
                    return Err(SyntaxError::AiIsNotValidDataAttribute {
                        ai: el.code.clone(),
                    });
                }
            }

            out.push_str(&el.code);
            out.push('=');
            out.push_str(&uri_escape(&el.value, true));
            out.push('&');
        }
    }

    // Trim the final character, either '?' or '&'.
    out.pop();
    Ok(out)
}
