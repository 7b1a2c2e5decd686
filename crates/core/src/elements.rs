//! AI element string parsers.
//!
//! [`parse_bracketed`] converts human-readable `(AI)value` input into the
//! canonical unbracketed form; [`process`] validates the canonical form and
//! optionally extracts the AIs.  Both populate the engine's canonical
//! buffer and parsed AI list.

use gs1_syntax_ai_tables::AiEntry;
use gs1_syntax_diagnostics::SyntaxError;

use crate::engine::{AiValue, Engine, Span, MAX_AIS};
use crate::lint;

/// Value length and content pre-checks, run before component validation so
/// that linter findings such as checksum failures are not reported for
/// values of the wrong length.
pub(crate) fn length_content_check(
    ai: &str,
    entry: &AiEntry,
    value: &str,
) -> Result<(), SyntaxError> {
    if value.len() < entry.min_length() {
        return Err(SyntaxError::AiValueIsTooShort { ai: ai.into() });
    }
    if value.len() > entry.max_length() {
        return Err(SyntaxError::AiValueIsTooLong { ai: ai.into() });
    }
    // Data "^" characters would be conflated with FNC1 separators.
    if value.contains('^') {
        return Err(SyntaxError::AiContainsIllegalCaratCharacter { ai: ai.into() });
    }
    Ok(())
}

/// Parse bracketed AI syntax into the canonical form, replacing the
/// engine's buffer and parsed AI list.
///
/// Each value extends to the next unescaped `(`; the sequence `\(`
/// represents a literal bracket.  A `^` FNC1 prefix is emitted before every
/// AI except those following a predefined fixed-length AI.
pub(crate) fn parse_bracketed(engine: &mut Engine, input: &str) -> Result<(), SyntaxError> {
    let table = engine.table_arc();
    let permit_unknown = engine.permit_unknown_ais();

    let mut out = String::with_capacity(input.len() + 8);
    let mut records: Vec<AiValue> = Vec::new();
    let mut fnc1req = true;

    let b = input.as_bytes();
    let mut i = 0;
    while i < b.len() {
        if b[i] != b'(' {
            return Err(SyntaxError::AiParseFailed); // expect start of AI
        }
        i += 1;
        let close = input[i..]
            .find(')')
            .map(|o| i + o)
            .ok_or(SyntaxError::AiParseFailed)?; // AI must terminate
        let ai = &input[i..close];
        let (entry_ref, entry) = table
            .lookup(ai, ai.len(), permit_unknown)
            .ok_or_else(|| SyntaxError::AiUnrecognised { ai: ai.into() })?;

        if fnc1req {
            out.push('^');
        }
        let ai_start = out.len();
        out.push_str(ai);
        let ai_span = Span::new(ai_start, out.len());
        fnc1req = entry.fnc1; // whether FNC1 is required before the next AI

        i = close + 1;
        if i >= b.len() {
            return Err(SyntaxError::AiParseFailed); // no value at end of input
        }

        // Copy the value up to the next unescaped bracket.
        let val_start = out.len();
        loop {
            match input[i..].find('(') {
                None => {
                    out.push_str(&input[i..]);
                    i = b.len();
                    break;
                }
                Some(o) => {
                    let p = i + o;
                    if p > i && b[p - 1] == b'\\' {
                        // Escaped data bracket; keep going.
                        out.push_str(&input[i..p - 1]);
                        out.push('(');
                        i = p + 1;
                    } else {
                        out.push_str(&input[i..p]);
                        i = p;
                        break;
                    }
                }
            }
        }

        length_content_check(ai, entry, &out[val_start..])?;

        if records.len() >= MAX_AIS {
            return Err(SyntaxError::TooManyAis);
        }
        records.push(AiValue::Element {
            entry: entry_ref,
            ai: ai_span,
            value: Span::new(val_start, out.len()),
            dl_path_order: None,
        });
    }

    engine.data_str = out;
    engine.ai_data = records;
    Ok(())
}

/// Validate the canonical unbracketed form in the engine's buffer, and with
/// `extract` replace the parsed AI list with the extracted AIs.
///
/// AIs of indeterminate length (the generic unknown pseudo-entry) cannot be
/// extracted from the canonical form because the AI cannot be separated
/// from its value.
pub(crate) fn process(engine: &mut Engine, extract: bool) -> Result<(), SyntaxError> {
    let table = engine.table_arc();
    let permit_unknown = engine.permit_unknown_ais();

    let records = {
        let data = &engine.data_str;
        let b = data.as_bytes();

        // FNC1 in first position.
        if b.first() != Some(&b'^') {
            return Err(SyntaxError::MissingFnc1InFirstPosition);
        }
        if b.len() < 2 {
            return Err(SyntaxError::AiDataEmpty);
        }

        let mut records: Vec<AiValue> = Vec::new();
        let mut i = 1;
        while i < b.len() {
            let rest = &data[i..];
            let found = table.lookup(rest, 0, permit_unknown);
            let (entry_ref, entry) = match found {
                Some(f) if !(extract && f.0.is_generic_unknown()) => f,
                _ => {
                    return Err(SyntaxError::NoAiForPrefix { data: rest.into() });
                }
            };

            let ailen = entry.ai.len();
            let ai_span = Span::new(i, i + ailen);
            let ai = &data[i..i + ailen];
            i += ailen;

            // The value runs to the next FNC1 or end of input; validation
            // reports how much of that it consumed.
            let r = data[i..].find('^').map(|o| i + o).unwrap_or(data.len());
            let consumed = lint::validate_ai_value(ai, entry, &data[i..r])?;

            if extract {
                if records.len() >= MAX_AIS {
                    return Err(SyntaxError::TooManyAis);
                }
                records.push(AiValue::Element {
                    entry: entry_ref,
                    ai: ai_span,
                    value: Span::new(i, i + consumed),
                    dl_path_order: None,
                });
            }

            i += consumed;
            // AIs requiring FNC1 must be terminated by one (or end of input).
            if entry.fnc1 && i < b.len() && b[i] != b'^' {
                return Err(SyntaxError::AiDataIsTooLong { ai: ai.into() });
            }
            // Skip FNC1, even at the end of fixed-length AIs.
            if i < b.len() && b[i] == b'^' {
                i += 1;
            }
        }
        records
    };

    if extract {
        engine.ai_data = records;
    }
    Ok(())
}
