//! Per-component value validation.
//!
//! Each component runs its character-set linter first, then its additional
//! linters in order.  The first failure aborts the AI and is reported with
//! `(AI)prefix|bad|suffix` markup isolating the offending span.

use gs1_syntax_ai_tables::AiEntry;
use gs1_syntax_diagnostics::{lint_markup, SyntaxError};
use gs1_syntax_linters::{linter_from_name, LintFailure};

/// Largest byte index `<= pos` that is a valid char boundary of `s`.
fn floor_char_boundary(s: &str, mut pos: usize) -> usize {
    if pos >= s.len() {
        return s.len();
    }
    while pos > 0 && !s.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Validate `value` against the component schema of `entry`, returning the
/// number of bytes consumed.
///
/// Components consume up to their maximum length; a trailing optional
/// component may be absent entirely.  `ai` is used only for error
/// reporting.
pub(crate) fn validate_ai_value(
    ai: &str,
    entry: &AiEntry,
    value: &str,
) -> Result<usize, SyntaxError> {
    if value.is_empty() {
        return Err(SyntaxError::AiDataIsEmpty { ai: ai.into() });
    }

    let mut consumed = 0usize;
    for part in &entry.components {
        let remaining = &value[consumed..];
        let len = floor_char_boundary(remaining, remaining.len().min(part.max));
        let compval = &remaining[..len];

        // Nothing to be done for an empty optional component.
        if part.optional && len == 0 {
            continue;
        }
        if len < part.min {
            return Err(SyntaxError::AiDataHasIncorrectLength { ai: ai.into() });
        }

        // The cset linter runs first, then each additional linter.
        if let Err(f) = part.cset.linter()(compval) {
            return Err(linter_error(ai, value, consumed, f));
        }
        for name in &part.linters {
            debug_assert!(linter_from_name(name).is_some(), "unresolvable linter {name}");
            if let Some(linter) = linter_from_name(name) {
                if let Err(f) = linter(compval) {
                    return Err(linter_error(ai, value, consumed, f));
                }
            }
        }

        consumed += len;
    }
    Ok(consumed)
}

fn linter_error(ai: &str, value: &str, offset: usize, failure: LintFailure) -> SyntaxError {
    SyntaxError::LinterFailure {
        ai: ai.into(),
        lint: failure.err,
        markup: lint_markup(ai, value, offset + failure.pos, failure.len),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs1_syntax_ai_tables::AiTable;
    use gs1_syntax_linters::LintErr;

    fn validate(ai: &str, value: &str) -> Result<usize, SyntaxError> {
        let table = AiTable::embedded();
        let (_, entry) = table.lookup(ai, ai.len(), false).expect("known AI");
        validate_ai_value(ai, entry, value)
    }

    #[test]
    fn consumes_component_lengths() {
        assert_eq!(validate("01", "12345678901231"), Ok(14));
        assert_eq!(validate("10", "ABC123"), Ok(6));
        // Optional second component absent.
        assert_eq!(validate("253", "1234567890128"), Ok(13));
        // Optional second component present.
        assert_eq!(validate("253", "1234567890128XYZ"), Ok(16));
    }

    #[test]
    fn empty_value_rejected() {
        assert_eq!(
            validate("10", ""),
            Err(SyntaxError::AiDataIsEmpty { ai: "10".into() })
        );
    }

    #[test]
    fn short_component_rejected() {
        assert_eq!(
            validate("01", "123"),
            Err(SyntaxError::AiDataHasIncorrectLength { ai: "01".into() })
        );
    }

    #[test]
    fn cset_linter_runs_first() {
        let err = validate("01", "1234567890123A").unwrap_err();
        assert_eq!(err.lint_err(), Some(LintErr::NonDigitCharacter));
    }

    #[test]
    fn additional_linters_run_in_order() {
        let err = validate("01", "12345678901234").unwrap_err();
        assert_eq!(err.lint_err(), Some(LintErr::IncorrectCheckDigit));
        assert_eq!(err.lint_markup(), Some("(01)1234567890123|4|"));
    }

    #[test]
    fn markup_offsets_include_earlier_components() {
        // 8008: N8,yymmddhh then [N..4],mmoptss; the bad second is in the
        // second component.
        let err = validate("8008", "201225230060").unwrap_err();
        assert_eq!(err.lint_err(), Some(LintErr::IllegalSecond));
        assert_eq!(err.lint_markup(), Some("(8008)2012252300|60|"));
    }
}
