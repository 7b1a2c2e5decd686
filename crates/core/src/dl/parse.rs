//! GS1 Digital Link URI parser.
//!
//! Decodes a DL URI into the canonical unbracketed form, validating the
//! key-to-key-qualifier associations in the path information and the
//! placement rules for query-string data attributes.
//!
//! "Convenience alphas" (e.g. `/gtin/0123…`, long deprecated) are not
//! supported.

use gs1_syntax_ai_tables::DlAttr;
use gs1_syntax_diagnostics::SyntaxError;

use crate::dl::escape::{uri_unescape, BAD_DOMAIN_CHARS, URI_CHARS};
use crate::elements::length_content_check;
use crate::engine::{AiValue, Engine, Span, Validation, MAX_AIS};

/// Left-pad a zero-suppressed GTIN value to its full 14 digits.
fn pad_gtin(value: &mut String) {
    if matches!(value.len(), 8 | 12 | 13) {
        *value = format!("{value:0>14}");
    }
}

/// Parse a DL URI, replacing the engine's canonical buffer and parsed AI
/// list.  The caller's input is only ever read.
pub(crate) fn parse(engine: &mut Engine, uri: &str) -> Result<(), SyntaxError> {
    let table = engine.table_arc();
    let permit_unknown = engine.permit_unknown_ais();

    if !uri.bytes().all(|c| URI_CHARS.bytes().any(|u| u == c)) {
        return Err(SyntaxError::UriContainsIllegalCharacters);
    }

    // Scheme must be http or https, in entirely upper or lower case.
    let rest = ["https://", "HTTPS://", "http://", "HTTP://"]
        .iter()
        .find_map(|scheme| uri.strip_prefix(scheme))
        .ok_or(SyntaxError::UriContainsIllegalScheme)?;

    let slash = rest
        .find('/')
        .ok_or(SyntaxError::UriMissingDomainAndPathInfo)?;
    if slash == 0 {
        return Err(SyntaxError::UriMissingDomainAndPathInfo);
    }
    let (domain, after_domain) = rest.split_at(slash);
    if domain.bytes().any(|c| BAD_DOMAIN_CHARS.bytes().any(|b| b == c)) {
        return Err(SyntaxError::DomainContainsIllegalCharacters);
    }

    // A fragment delimits the end of the data; a query marker the end of
    // the path info.
    let before_fragment = after_domain
        .split_once('#')
        .map_or(after_domain, |(data, _)| data);
    let (path, query) = match before_fragment.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (before_fragment, None),
    };

    // Search backwards through the path info, an /AI/value pair at a time,
    // for the rightmost pair whose AI is a DL primary key; everything
    // before it is the stem.
    let segments: Vec<&str> = path[1..].split('/').collect();
    let mut key_idx = None;
    let mut i = segments.len();
    while i >= 2 {
        let candidate = segments[i - 2];
        let Some((_, entry)) = table.lookup(candidate, candidate.len(), permit_unknown) else {
            break;
        };
        if engine.key_qualifiers().contains(&entry.ai) {
            key_idx = Some(i - 2);
            break;
        }
        i -= 2;
    }
    let Some(key_idx) = key_idx else {
        return Err(SyntaxError::NoGs1DlKeysFoundInPathInfo);
    };

    let mut out = String::new();
    let mut records: Vec<AiValue> = Vec::new();
    let mut fnc1req = true;
    let mut path_codes: Vec<String> = Vec::new();

    // Process each AI/value pair in the DL path info.
    let mut j = key_idx;
    while j < segments.len() {
        let ai = segments[j];
        let (entry_ref, entry) = table
            .lookup(ai, ai.len(), permit_unknown)
            .ok_or_else(|| SyntaxError::AiUnrecognised { ai: ai.into() })?;

        let raw_value = segments.get(j + 1).copied().unwrap_or("");
        if raw_value.is_empty() {
            return Err(SyntaxError::AiValuePathElementIsEmpty { ai: ai.into() });
        }
        let mut value = uri_unescape(raw_value, false)
            .ok_or_else(|| SyntaxError::DecodedAiValueContainsIllegalNull { ai: ai.into() })?;

        // Legacy handling of AI (01): pad up to a GTIN-14 when enabled.
        if entry.ai == "01" && engine.permit_zero_suppressed_gtin_in_dl_uris() {
            pad_gtin(&mut value);
        }

        if fnc1req {
            out.push('^');
        }
        let ai_start = out.len();
        out.push_str(ai);
        let ai_span = Span::new(ai_start, out.len());
        fnc1req = entry.fnc1;

        let value_start = out.len();
        out.push_str(&value);

        length_content_check(ai, entry, &value)?;

        if records.len() >= MAX_AIS {
            return Err(SyntaxError::TooManyAis);
        }
        records.push(AiValue::Element {
            entry: entry_ref,
            ai: ai_span,
            value: Span::new(value_start, out.len()),
            dl_path_order: Some(path_codes.len()),
        });
        path_codes.push(entry.ai.clone());
        j += 2;
    }
    let num_path_ais = records.len();

    // Process the query parameters.
    for segment in query.unwrap_or("").split('&').filter(|s| !s.is_empty()) {
        let Some((key, raw_value)) = segment.split_once('=') else {
            // Parameters with no value are preserved as ignored content.
            if records.len() >= MAX_AIS {
                return Err(SyntaxError::TooManyAis);
            }
            records.push(AiValue::DlIgnored {
                raw: segment.to_string(),
            });
            continue;
        };

        if !key.bytes().all(|b| b.is_ascii_digit()) {
            // Non-numeric query parameters are skipped, but preserved.
            if records.len() >= MAX_AIS {
                return Err(SyntaxError::TooManyAis);
            }
            records.push(AiValue::DlIgnored {
                raw: segment.to_string(),
            });
            continue;
        }

        // Numeric query parameters that do not match an AI aren't allowed.
        let Some((entry_ref, entry)) = table.lookup(key, key.len(), permit_unknown) else {
            return Err(SyntaxError::UnknownAiInQueryParams { ai: key.into() });
        };

        if raw_value.is_empty() {
            return Err(SyntaxError::AiValueQueryElementIsEmpty { ai: key.into() });
        }
        let mut value = uri_unescape(raw_value, true)
            .ok_or_else(|| SyntaxError::DecodedAiValueContainsIllegalNull { ai: key.into() })?;

        // AI (01) in the query is padded to a GTIN-14 unconditionally.
        if entry.ai == "01" {
            pad_gtin(&mut value);
        }

        if fnc1req {
            out.push('^');
        }
        let ai_start = out.len();
        out.push_str(key);
        let ai_span = Span::new(ai_start, out.len());
        fnc1req = entry.fnc1;

        let value_start = out.len();
        out.push_str(&value);

        length_content_check(key, entry, &value)?;

        if records.len() >= MAX_AIS {
            return Err(SyntaxError::TooManyAis);
        }
        records.push(AiValue::Element {
            entry: entry_ref,
            ai: ai_span,
            value: Span::new(value_start, out.len()),
            dl_path_order: None,
        });
    }

    engine.data_str = out;
    engine.ai_data = records;

    // The path AI sequence must be a valid key-qualifier association.
    if !engine.key_qualifiers().contains(&path_codes.join(" ")) {
        return Err(SyntaxError::InvalidKeyQualifierSequence);
    }

    // Validate that query attributes are permitted and do not instead
    // belong within the path info.
    if num_path_ais < MAX_AIS {
        let els = engine.elements();
        for el in &els {
            if el.dl_path_order.is_some() {
                continue;
            }

            // Forbid duplicate AIs.
            for other in &els {
                if other.index >= el.index {
                    break;
                }
                if other.ai == el.ai {
                    return Err(SyntaxError::DuplicateAi { ai: el.ai.into() });
                }
            }

            // The AI must be a permitted DL URI data attribute.
            let unknown_forbidden = engine.validation_enabled(Validation::UnknownAiNotDlAttr);
            match el.entry.dl_attr {
                DlAttr::Permitted => {}
                DlAttr::Unknown if !unknown_forbidden => {}
                _ => {
                    return Err(SyntaxError::AiIsNotValidDataAttribute { ai: el.ai.into() });
                }
            }

            // Trial the AI at each non-initial path position; if any
            // insertion forms a valid key-qualifier sequence the AI
            // belongs in the path info, not the query.
            for pos in 1..=path_codes.len() {
                let mut trial: Vec<&str> = Vec::with_capacity(path_codes.len() + 1);
                trial.extend(path_codes[..pos].iter().map(String::as_str));
                trial.push(&el.entry.ai);
                trial.extend(path_codes[pos..].iter().map(String::as_str));
                if engine.key_qualifiers().contains(&trial.join(" ")) {
                    return Err(SyntaxError::AiShouldBeInPathInfo {
                        ai: el.entry.ai.clone(),
                    });
                }
            }
        }
    }

    Ok(())
}
