//! Cross-AI validation.
//!
//! Runs the enabled validations in table order over the extracted AIs; the
//! first failure aborts.  Constraint tokens from the dictionary `ex=` and
//! `req=` attributes match extracted AIs by digit prefix, so a token such
//! as `392n` matches any AI whose code begins `392`.

use gs1_syntax_diagnostics::SyntaxError;

use crate::engine::{ElementView, Engine, Validation};

/// Execute each enabled validation in turn.
pub(crate) fn run(engine: &Engine) -> Result<(), SyntaxError> {
    for v in Validation::ALL {
        if !engine.validation_enabled(v) {
            continue;
        }
        match v {
            Validation::MutexAis => mutex(engine)?,
            Validation::RequisiteAis => requisites(engine)?,
            Validation::RepeatedAis => repeats(engine)?,
            Validation::DigsigSerialKey => digsig(engine)?,
            // Consulted by the DL URI parser and generator, not here.
            Validation::UnknownAiNotDlAttr => {}
        }
    }
    Ok(())
}

/// Find an extracted AI matching the digit prefix of `pattern`, skipping
/// AIs whose code equals `ignore` so a self-referencing pattern does not
/// trigger on its own AI.
///
/// Given the small number of extracted AIs there is little to be gained
/// over simply walking the list.
fn find_match<'a, 'e>(
    els: &'a [ElementView<'e>],
    pattern: &str,
    ignore: Option<&str>,
) -> Option<&'a ElementView<'e>> {
    let digits = pattern.bytes().take_while(u8::is_ascii_digit).count();
    let prefix = &pattern[..digits];
    els.iter().find(|el| {
        el.stream.starts_with(prefix) && ignore.map_or(true, |ig| el.ai != ig)
    })
}

/// `ex=` attributes: mutually exclusive AIs must not co-occur.
fn mutex(engine: &Engine) -> Result<(), SyntaxError> {
    let els = engine.elements();
    for el in &els {
        for token in el.entry.attr_tokens() {
            let Some(list) = token.strip_prefix("ex=") else {
                continue;
            };
            for pattern in list.split(',') {
                if let Some(matched) = find_match(&els, pattern, Some(el.ai)) {
                    return Err(SyntaxError::InvalidAiPairs {
                        ai: el.ai.into(),
                        other: matched.ai.into(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// `req=` attributes: every comma-separated group is one or more AIs joined
/// by `+`, all of which must be present; any wholly present group satisfies
/// the requisite.
fn requisites(engine: &Engine) -> Result<(), SyntaxError> {
    let els = engine.elements();
    for el in &els {
        for token in el.entry.attr_tokens() {
            let Some(spec) = token.strip_prefix("req=") else {
                continue;
            };
            let satisfied = spec.split(',').any(|group| {
                group
                    .split('+')
                    .all(|pattern| find_match(&els, pattern, Some(el.ai)).is_some())
            });
            if !satisfied {
                return Err(SyntaxError::RequiredAisNotSatisfied {
                    ai: el.ai.into(),
                    req: spec.into(),
                });
            }
        }
    }
    Ok(())
}

/// Repeated AIs must have identical values.  (Repeats occur when data from
/// multiple symbol carriers on one label is concatenated.)
fn repeats(engine: &Engine) -> Result<(), SyntaxError> {
    let els = engine.elements();
    for (i, el) in els.iter().enumerate() {
        for other in &els[i + 1..] {
            if el.ai == other.ai && el.value != other.value {
                return Err(SyntaxError::InstancesOfAiHaveDifferentValues { ai: el.ai.into() });
            }
        }
    }
    Ok(())
}

/// AIs (253), (255) and (8003) must include their serial component when a
/// digital signature (8030) is present.
fn digsig(engine: &Engine) -> Result<(), SyntaxError> {
    let els = engine.elements();
    if find_match(&els, "8030", None).is_none() {
        return Ok(());
    }
    for el in &els {
        if !matches!(el.entry.ai.as_str(), "253" | "255" | "8003") {
            continue;
        }
        if el.value.len() == el.entry.min_length() {
            return Err(SyntaxError::SerialNotPresent { ai: el.ai.into() });
        }
    }
    Ok(())
}
