//! Typed error surface for the GS1 syntax engine.
//!
//! Errors are values: every fallible engine operation returns a
//! [`SyntaxError`], which carries both a stable machine-readable code
//! (via [`SyntaxError::code`]) and a human-readable message (via `Display`).
//! Linter failures additionally carry the granular
//! [`LintErr`](gs1_syntax_linters::LintErr) code and a three-part markup
//! string `(AI)prefix|bad|suffix` highlighting the offending span.

#![warn(missing_docs)]

use gs1_syntax_linters::LintErr;

/// Errors reported by the engine's parsing, validation and generation
/// operations.
///
/// Each variant carries enough context to produce a helpful message. Use
/// [`SyntaxError::code`] for a stable identifier suitable for programmatic
/// matching and serialization.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    // -- Input limits --
    /// The input exceeds the maximum supported length.
    #[error("input is longer than the maximum of {max} characters")]
    DataTooLong {
        /// The configured maximum input length.
        max: usize,
    },

    /// More AIs were supplied than the engine can hold.
    #[error("too many AIs")]
    TooManyAis,

    // -- AI element string parsing --
    /// Bracketed input did not match the `(AI)value` grammar.
    #[error("failed to parse AI data")]
    AiParseFailed,

    /// An AI was not found in the dictionary (and was not vivifiable).
    #[error("unrecognised AI: ({ai})")]
    AiUnrecognised {
        /// The offending AI digits.
        ai: String,
    },

    /// Unbracketed input did not begin with the FNC1 character `^`.
    #[error("missing FNC1 in first position")]
    MissingFnc1InFirstPosition,

    /// Unbracketed input contained no AI data after the leading `^`.
    #[error("the AI data is empty")]
    AiDataEmpty,

    /// No dictionary AI matches a prefix of the remaining data.
    #[error("no AI matches the data prefix: {data}")]
    NoAiForPrefix {
        /// The start of the unmatched data.
        data: String,
    },

    /// An AI's value is empty.
    #[error("AI ({ai}) value is empty")]
    AiDataIsEmpty {
        /// The AI whose value is missing.
        ai: String,
    },

    /// An AI's value is shorter than the sum of its mandatory minima.
    #[error("AI ({ai}) value is too short")]
    AiValueIsTooShort {
        /// The AI whose value is too short.
        ai: String,
    },

    /// An AI's value is longer than the sum of its component maxima.
    #[error("AI ({ai}) value is too long")]
    AiValueIsTooLong {
        /// The AI whose value is too long.
        ai: String,
    },

    /// An AI's value contains the reserved FNC1 sentinel `^`.
    #[error("AI ({ai}) contains illegal ^ character")]
    AiContainsIllegalCaratCharacter {
        /// The AI whose value contains `^`.
        ai: String,
    },

    /// A component of an AI's value has an incorrect length.
    #[error("AI ({ai}) data has incorrect length")]
    AiDataHasIncorrectLength {
        /// The AI whose component lengths are wrong.
        ai: String,
    },

    /// A fixed-length AI ran past its expected length without an FNC1.
    #[error("AI ({ai}) data is too long")]
    AiDataIsTooLong {
        /// The overlong AI.
        ai: String,
    },

    /// A component linter rejected an AI's value.
    #[error("AI ({ai}) is invalid: {lint}")]
    LinterFailure {
        /// The AI whose value failed linting.
        ai: String,
        /// The granular linter failure code.
        lint: LintErr,
        /// Markup of the form `(AI)prefix|bad|suffix` isolating the
        /// offending span of the value.
        markup: String,
    },

    // -- DL URI parsing --
    /// The URI contains characters outside the URI alphabet.
    #[error("URI contains illegal characters")]
    UriContainsIllegalCharacters,

    /// The URI scheme is not `http`/`https` (single-case).
    #[error("URI scheme must be http:// or https://")]
    UriContainsIllegalScheme,

    /// The URI has no domain or no path information.
    #[error("URI is missing a domain and path info")]
    UriMissingDomainAndPathInfo,

    /// The domain contains characters not permitted in a domain name.
    #[error("domain contains illegal characters")]
    DomainContainsIllegalCharacters,

    /// No primary-key AI was found in the URI path information.
    #[error("no GS1 DL keys found in path info")]
    NoGs1DlKeysFoundInPathInfo,

    /// A path `/AI/value` pair has an empty value.
    #[error("AI ({ai}) path element has an empty value")]
    AiValuePathElementIsEmpty {
        /// The AI with the empty path value.
        ai: String,
    },

    /// A query `AI=value` pair has an empty value.
    #[error("AI ({ai}) query element has an empty value")]
    AiValueQueryElementIsEmpty {
        /// The AI with the empty query value.
        ai: String,
    },

    /// Percent-decoding produced an illegal NUL byte.
    #[error("AI ({ai}) value decodes to an illegal NUL character")]
    DecodedAiValueContainsIllegalNull {
        /// The AI whose value decoded to NUL.
        ai: String,
    },

    /// An all-digit query key is not a known AI.
    #[error("unknown AI ({ai}) in query parameters")]
    UnknownAiInQueryParams {
        /// The unrecognised query key.
        ai: String,
    },

    /// The path AI sequence is not a valid key-qualifier association.
    #[error("invalid key-qualifier sequence in path info")]
    InvalidKeyQualifierSequence,

    /// The same AI appears more than once in a DL URI.
    #[error("duplicate AI ({ai})")]
    DuplicateAi {
        /// The duplicated AI.
        ai: String,
    },

    /// A query attribute AI belongs in the path information.
    #[error("AI ({ai}) should be in the path info")]
    AiShouldBeInPathInfo {
        /// The misplaced AI.
        ai: String,
    },

    /// An AI is not a permitted DL URI data attribute.
    #[error("AI ({ai}) is not a valid DL URI data attribute")]
    AiIsNotValidDataAttribute {
        /// The forbidden AI.
        ai: String,
    },

    // -- DL URI generation --
    /// No parsed AI is eligible to be a DL primary key.
    #[error("cannot create a DL URI without a primary key AI")]
    CannotCreateDlUriWithoutPrimaryKeyAi,

    // -- Cross-AI validation --
    /// Two mutually exclusive AIs are both present.
    #[error("AIs ({ai}) and ({other}) are invalid together")]
    InvalidAiPairs {
        /// The AI declaring the exclusion.
        ai: String,
        /// The AI that matched the exclusion pattern.
        other: String,
    },

    /// An AI's requisite AIs are not present.
    #[error("AI ({ai}) requires AIs that are not present: {req}")]
    RequiredAisNotSatisfied {
        /// The AI whose requisites are unmet.
        ai: String,
        /// The unmet requisite specification.
        req: String,
    },

    /// Repeated instances of an AI carry different values.
    #[error("instances of AI ({ai}) have different values")]
    InstancesOfAiHaveDifferentValues {
        /// The inconsistently repeated AI.
        ai: String,
    },

    /// A serialised key AI lacks its serial component in the presence of a
    /// digital signature.
    #[error("AI ({ai}) must include a serial component when used with AI (8030)")]
    SerialNotPresent {
        /// The key AI missing its serial component.
        ai: String,
    },

    // -- Configuration --
    /// An attempt was made to toggle a locked validation.
    #[error("validation is locked and cannot be toggled")]
    ValidationLocked,
}

impl SyntaxError {
    /// Stable machine-readable identifier for this error.
    pub fn code(&self) -> &'static str {
        match self {
            SyntaxError::DataTooLong { .. } => "DATA_TOO_LONG",
            SyntaxError::TooManyAis => "TOO_MANY_AIS",
            SyntaxError::AiParseFailed => "AI_PARSE_FAILED",
            SyntaxError::AiUnrecognised { .. } => "AI_UNRECOGNISED",
            SyntaxError::MissingFnc1InFirstPosition => "MISSING_FNC1_IN_FIRST_POSITION",
            SyntaxError::AiDataEmpty => "AI_DATA_EMPTY",
            SyntaxError::NoAiForPrefix { .. } => "NO_AI_FOR_PREFIX",
            SyntaxError::AiDataIsEmpty { .. } => "AI_DATA_IS_EMPTY",
            SyntaxError::AiValueIsTooShort { .. } => "AI_VALUE_IS_TOO_SHORT",
            SyntaxError::AiValueIsTooLong { .. } => "AI_VALUE_IS_TOO_LONG",
            SyntaxError::AiContainsIllegalCaratCharacter { .. } => {
                "AI_CONTAINS_ILLEGAL_CARAT_CHARACTER"
            }
            SyntaxError::AiDataHasIncorrectLength { .. } => "AI_DATA_HAS_INCORRECT_LENGTH",
            SyntaxError::AiDataIsTooLong { .. } => "AI_DATA_IS_TOO_LONG",
            SyntaxError::LinterFailure { .. } => "AI_LINTER_ERROR",
            SyntaxError::UriContainsIllegalCharacters => "URI_CONTAINS_ILLEGAL_CHARACTERS",
            SyntaxError::UriContainsIllegalScheme => "URI_CONTAINS_ILLEGAL_SCHEME",
            SyntaxError::UriMissingDomainAndPathInfo => "URI_MISSING_DOMAIN_AND_PATH_INFO",
            SyntaxError::DomainContainsIllegalCharacters => "DOMAIN_CONTAINS_ILLEGAL_CHARACTERS",
            SyntaxError::NoGs1DlKeysFoundInPathInfo => "NO_GS1_DL_KEYS_FOUND_IN_PATH_INFO",
            SyntaxError::AiValuePathElementIsEmpty { .. } => "AI_VALUE_PATH_ELEMENT_IS_EMPTY",
            SyntaxError::AiValueQueryElementIsEmpty { .. } => "AI_VALUE_QUERY_ELEMENT_IS_EMPTY",
            SyntaxError::DecodedAiValueContainsIllegalNull { .. } => {
                "DECODED_AI_VALUE_CONTAINS_ILLEGAL_NULL"
            }
            SyntaxError::UnknownAiInQueryParams { .. } => "UNKNOWN_AI_IN_QUERY_PARAMS",
            SyntaxError::InvalidKeyQualifierSequence => "INVALID_KEY_QUALIFIER_SEQUENCE",
            SyntaxError::DuplicateAi { .. } => "DUPLICATE_AI",
            SyntaxError::AiShouldBeInPathInfo { .. } => "AI_SHOULD_BE_IN_PATH_INFO",
            SyntaxError::AiIsNotValidDataAttribute { .. } => "AI_IS_NOT_VALID_DATA_ATTRIBUTE",
            SyntaxError::CannotCreateDlUriWithoutPrimaryKeyAi => {
                "CANNOT_CREATE_DL_URI_WITHOUT_PRIMARY_KEY_AI"
            }
            SyntaxError::InvalidAiPairs { .. } => "INVALID_AI_PAIRS",
            SyntaxError::RequiredAisNotSatisfied { .. } => "REQUIRED_AIS_NOT_SATISFIED",
            SyntaxError::InstancesOfAiHaveDifferentValues { .. } => {
                "INSTANCES_OF_AI_HAVE_DIFFERENT_VALUES"
            }
            SyntaxError::SerialNotPresent { .. } => "SERIAL_NOT_PRESENT",
            SyntaxError::ValidationLocked => "VALIDATION_LOCKED",
        }
    }

    /// The linter failure code, when this error is a [`SyntaxError::LinterFailure`].
    pub fn lint_err(&self) -> Option<LintErr> {
        match self {
            SyntaxError::LinterFailure { lint, .. } => Some(*lint),
            _ => None,
        }
    }

    /// The `(AI)prefix|bad|suffix` markup, when this error is a
    /// [`SyntaxError::LinterFailure`].
    pub fn lint_markup(&self) -> Option<&str> {
        match self {
            SyntaxError::LinterFailure { markup, .. } => Some(markup),
            _ => None,
        }
    }
}

/// Render the `(AI)prefix|bad|suffix` markup for a linter failure at
/// `[pos, pos + len)` within `value`.
///
/// Offsets past the end of the value are clamped rather than panicking so a
/// misbehaving linter cannot poison error reporting.
pub fn lint_markup(ai: &str, value: &str, pos: usize, len: usize) -> String {
    let mut pos = pos.min(value.len());
    while pos > 0 && !value.is_char_boundary(pos) {
        pos -= 1;
    }
    let mut end = pos.saturating_add(len).min(value.len());
    while end < value.len() && !value.is_char_boundary(end) {
        end += 1;
    }
    format!(
        "({ai}){}|{}|{}",
        &value[..pos],
        &value[pos..end],
        &value[end..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_stable() {
        assert_eq!(
            SyntaxError::DuplicateAi { ai: "01".into() }.code(),
            "DUPLICATE_AI"
        );
        assert_eq!(
            SyntaxError::CannotCreateDlUriWithoutPrimaryKeyAi.code(),
            "CANNOT_CREATE_DL_URI_WITHOUT_PRIMARY_KEY_AI"
        );
    }

    #[test]
    fn display_includes_ai() {
        let e = SyntaxError::AiUnrecognised { ai: "89".into() };
        assert_eq!(e.to_string(), "unrecognised AI: (89)");
    }

    #[test]
    fn linter_failure_accessors() {
        let e = SyntaxError::LinterFailure {
            ai: "00".into(),
            lint: LintErr::IncorrectCheckDigit,
            markup: "(00)12345678901234567|0|".into(),
        };
        assert_eq!(e.lint_err(), Some(LintErr::IncorrectCheckDigit));
        assert_eq!(e.lint_markup(), Some("(00)12345678901234567|0|"));
        assert_eq!(SyntaxError::TooManyAis.lint_err(), None);
    }

    #[test]
    fn markup_isolates_bad_span() {
        assert_eq!(lint_markup("10", "AB C", 2, 1), "(10)AB| |C");
        assert_eq!(lint_markup("10", "ABC", 0, 3), "(10)|ABC|");
        assert_eq!(lint_markup("10", "", 0, 0), "(10)||");
    }

    #[test]
    fn markup_clamps_out_of_range() {
        assert_eq!(lint_markup("10", "AB", 5, 9), "(10)AB||");
        assert_eq!(lint_markup("10", "AB", 1, 9), "(10)A|B|");
    }
}
