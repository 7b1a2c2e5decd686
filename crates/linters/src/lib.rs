//! Component linters for GS1 Application Identifier values.
//!
//! Each linter is a pure function over a single AI component's value,
//! returning either success or a [`LintFailure`] that pinpoints the offending
//! span. Linters are referenced by name from AI dictionary entries and
//! resolved through [`linter_from_name`].
//!
//! The character-set linters ([`cset_numeric`], [`cset82`], [`cset39`],
//! [`cset64`]) police the GS1 N/X/Y/Z character sets; the remaining linters
//! implement the domain rules attached to specific AIs (check digits, GS1
//! Company Prefix shape, dates, piece-of-total pairs, and so on).

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

mod checksum;
mod cset;
mod date;
mod iso;
mod key;
mod num;

pub use checksum::{csum, csumalpha};
pub use cset::{cset39, cset64, cset82, cset_numeric};
pub use date::{mmoptss, yymmd0, yymmdd, yymmddhh};
pub use iso::{iso3166, iso3166999, iso3166alpha2, iso4217};
pub use key::{hasnondigit, importeridx, key, keyoff1};
pub use num::{nonzero, nozeroprefix, pieceoftotal, posinseqslash, winding, yesno, zero};

/// Granular linter failure codes.
///
/// A flat enumeration mirroring the failure conditions of the individual
/// linters. `Display` renders a short human-readable description.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LintErr {
    /// A non-digit character was found where a digit is expected.
    NonDigitCharacter,
    /// A character outside CSET 82 was found.
    InvalidCset82Character,
    /// A character outside CSET 39 was found.
    InvalidCset39Character,
    /// A character outside CSET 32 was found.
    InvalidCset32Character,
    /// A character outside CSET 64 was found.
    InvalidCset64Character,
    /// Incorrect `=` padding in a CSET 64 value.
    InvalidCset64Padding,
    /// The numeric check digit is incorrect.
    IncorrectCheckDigit,
    /// The component is too short to carry a numeric check digit.
    TooShortForCheckDigit,
    /// The alphanumeric check-character pair is incorrect.
    IncorrectCheckPair,
    /// The component is too short to carry a check-character pair.
    TooShortForCheckPair,
    /// The component exceeds the check-pair implementation limit.
    TooLongForCheckPairImplementation,
    /// The component is too short to contain a GS1 Company Prefix.
    TooShortForKey,
    /// The GS1 Company Prefix region is not all digits.
    InvalidGcpPrefix,
    /// An invalid character in an importer index component.
    InvalidImportIdxCharacter,
    /// A non-digit character is required but the value is all digits.
    RequiresNonDigitCharacter,
    /// The value must not be all zeros.
    IllegalZeroValue,
    /// The value must be zero.
    NotZero,
    /// The value must not have a zero prefix.
    IllegalZeroPrefix,
    /// The value must be "0" or "1".
    NotZeroOrOne,
    /// The winding direction must be "0", "1" or "9".
    InvalidWindingDirection,
    /// Not a valid ISO 3166 numeric country code.
    NotIso3166,
    /// Not a valid ISO 3166 numeric country code or "999".
    NotIso3166Or999,
    /// Not a valid ISO 3166 alpha-2 country code.
    NotIso3166Alpha2,
    /// Not a valid ISO 4217 numeric currency code.
    NotIso4217,
    /// A date component is too short.
    DateTooShort,
    /// A date component is too long.
    DateTooLong,
    /// The month is outside 01-12.
    IllegalMonth,
    /// The day is invalid for the given month.
    IllegalDay,
    /// The hour is outside 00-23.
    IllegalHour,
    /// The minute is outside 00-59.
    IllegalMinute,
    /// The second is outside 00-59.
    IllegalSecond,
    /// A minute component is too short.
    MinuteTooShort,
    /// A seconds component is too short.
    SecondTooShort,
    /// A seconds component is too long.
    SecondTooLong,
    /// A piece-of-total component has an odd length.
    InvalidLengthForPieceOfTotal,
    /// The piece number of a piece-of-total pair is zero.
    ZeroPieceNumber,
    /// The total pieces of a piece-of-total pair is zero.
    ZeroTotalPieces,
    /// The piece number exceeds the total pieces.
    PieceNumberExceedsTotal,
    /// A position/end pair is not of the form `<pos>/<end>`.
    PositionInSequenceMalformed,
    /// The position exceeds the end of the sequence.
    PositionExceedsEnd,
}

impl std::fmt::Display for LintErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            LintErr::NonDigitCharacter => "non-digit character",
            LintErr::InvalidCset82Character => "invalid CSET 82 character",
            LintErr::InvalidCset39Character => "invalid CSET 39 character",
            LintErr::InvalidCset32Character => "invalid CSET 32 character",
            LintErr::InvalidCset64Character => "invalid CSET 64 character",
            LintErr::InvalidCset64Padding => "invalid CSET 64 padding",
            LintErr::IncorrectCheckDigit => "incorrect check digit",
            LintErr::TooShortForCheckDigit => "too short for check digit",
            LintErr::IncorrectCheckPair => "incorrect check character pair",
            LintErr::TooShortForCheckPair => "too short for check character pair",
            LintErr::TooLongForCheckPairImplementation => {
                "too long for check character pair implementation"
            }
            LintErr::TooShortForKey => "too short to contain a GS1 Company Prefix",
            LintErr::InvalidGcpPrefix => "invalid GS1 Company Prefix",
            LintErr::InvalidImportIdxCharacter => "invalid importer index character",
            LintErr::RequiresNonDigitCharacter => "a non-digit character is required",
            LintErr::IllegalZeroValue => "zero value is not permitted",
            LintErr::NotZero => "value must be zero",
            LintErr::IllegalZeroPrefix => "zero prefix is not permitted",
            LintErr::NotZeroOrOne => "value must be 0 or 1",
            LintErr::InvalidWindingDirection => "invalid winding direction",
            LintErr::NotIso3166 => "not an ISO 3166 country code",
            LintErr::NotIso3166Or999 => "not an ISO 3166 country code or 999",
            LintErr::NotIso3166Alpha2 => "not an ISO 3166 alpha-2 country code",
            LintErr::NotIso4217 => "not an ISO 4217 currency code",
            LintErr::DateTooShort => "date is too short",
            LintErr::DateTooLong => "date is too long",
            LintErr::IllegalMonth => "illegal month",
            LintErr::IllegalDay => "illegal day",
            LintErr::IllegalHour => "illegal hour",
            LintErr::IllegalMinute => "illegal minute",
            LintErr::IllegalSecond => "illegal second",
            LintErr::MinuteTooShort => "minute component is too short",
            LintErr::SecondTooShort => "seconds component is too short",
            LintErr::SecondTooLong => "seconds component is too long",
            LintErr::InvalidLengthForPieceOfTotal => "invalid length for piece of total",
            LintErr::ZeroPieceNumber => "piece number must not be zero",
            LintErr::ZeroTotalPieces => "total pieces must not be zero",
            LintErr::PieceNumberExceedsTotal => "piece number exceeds total pieces",
            LintErr::PositionInSequenceMalformed => "position in sequence is malformed",
            LintErr::PositionExceedsEnd => "position exceeds end of sequence",
        };
        f.write_str(msg)
    }
}

/// A linter failure: the error code plus the byte span of the offending
/// characters within the component value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintFailure {
    /// The failure code.
    pub err: LintErr,
    /// Byte offset of the first offending character.
    pub pos: usize,
    /// Length of the offending span.
    pub len: usize,
}

impl LintFailure {
    /// Create a failure for the span `[pos, pos + len)`.
    pub fn new(err: LintErr, pos: usize, len: usize) -> Self {
        Self { err, pos, len }
    }
}

/// The linter calling convention: a pure function of the component value.
pub type Linter = fn(&str) -> Result<(), LintFailure>;

// ─── Name registry ──────────────────────────────────────────────────────────

/// Sorted name → function table, binary-searched by [`linter_from_name`].
static LINTER_REGISTRY: &[(&str, Linter)] = &[
    ("cset39", cset39),
    ("cset64", cset64),
    ("cset82", cset82),
    ("csetnumeric", cset_numeric),
    ("csum", csum),
    ("csumalpha", csumalpha),
    ("hasnondigit", hasnondigit),
    ("importeridx", importeridx),
    ("iso3166", iso3166),
    ("iso3166999", iso3166999),
    ("iso3166alpha2", iso3166alpha2),
    ("iso4217", iso4217),
    ("key", key),
    ("keyoff1", keyoff1),
    ("mmoptss", mmoptss),
    ("nonzero", nonzero),
    ("nozeroprefix", nozeroprefix),
    ("pieceoftotal", pieceoftotal),
    ("posinseqslash", posinseqslash),
    ("winding", winding),
    ("yesno", yesno),
    ("yymmd0", yymmd0),
    ("yymmdd", yymmdd),
    ("yymmddhh", yymmddhh),
    ("zero", zero),
];

/// Return the linter function registered under `name`, if any.
pub fn linter_from_name(name: &str) -> Option<Linter> {
    LINTER_REGISTRY
        .binary_search_by(|(n, _)| n.cmp(&name))
        .ok()
        .map(|i| LINTER_REGISTRY[i].1)
}
