//! GS1 character-set linters.
//!
//! CSET 82 is the file-safe alphanumeric set used by most `X` components,
//! CSET 39 the reduced set for `Y` components, and CSET 64 the URL-safe
//! base64 alphabet (with optional `=` padding) used by `Z` components.

use crate::{LintErr, LintFailure};

const CSET82: &str =
    "!\"%&'()*+,-./0123456789:;<=>?ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

const CSET39: &str = "#-/0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const CSET64: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

pub(crate) const CSET32: &str = "23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Position of the first byte of `data` not contained in `set`, if any.
fn first_outside(data: &str, set: &str) -> Option<usize> {
    data.bytes().position(|b| !set.bytes().any(|s| s == b))
}

/// All characters must be digits.
pub fn cset_numeric(data: &str) -> Result<(), LintFailure> {
    match data.bytes().position(|b| !b.is_ascii_digit()) {
        Some(pos) => Err(LintFailure::new(LintErr::NonDigitCharacter, pos, 1)),
        None => Ok(()),
    }
}

/// All characters must belong to CSET 82.
pub fn cset82(data: &str) -> Result<(), LintFailure> {
    match first_outside(data, CSET82) {
        Some(pos) => Err(LintFailure::new(LintErr::InvalidCset82Character, pos, 1)),
        None => Ok(()),
    }
}

/// All characters must belong to CSET 39.
pub fn cset39(data: &str) -> Result<(), LintFailure> {
    match first_outside(data, CSET39) {
        Some(pos) => Err(LintFailure::new(LintErr::InvalidCset39Character, pos, 1)),
        None => Ok(()),
    }
}

/// All characters must belong to CSET 64, with well-formed `=` padding.
///
/// At most two padding characters are permitted, only at the end, and only
/// when they bring the total length up to a multiple of three.
pub fn cset64(data: &str) -> Result<(), LintFailure> {
    let total = data.len();
    let stripped = data.trim_end_matches('=');
    let pads = total - stripped.len();

    if pads > 2 || (pads > 0 && total % 3 != 0) {
        return Err(LintFailure::new(
            LintErr::InvalidCset64Padding,
            stripped.len(),
            pads,
        ));
    }
    match first_outside(stripped, CSET64) {
        Some(pos) => Err(LintFailure::new(LintErr::InvalidCset64Character, pos, 1)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_accepts_digits() {
        assert!(cset_numeric("").is_ok());
        assert!(cset_numeric("0123456789").is_ok());
    }

    #[test]
    fn numeric_rejects_non_digit() {
        let f = cset_numeric("12A4").unwrap_err();
        assert_eq!(f.err, LintErr::NonDigitCharacter);
        assert_eq!((f.pos, f.len), (2, 1));
    }

    #[test]
    fn cset82_accepts_full_alphabet() {
        assert!(cset82("!\"%&'()*+,-/012345").is_ok());
        assert!(cset82("6789:;<=>?ABCDEFGHIJ").is_ok());
        assert!(cset82("KLMNOPQRSTUVWXYZ_abc").is_ok());
        assert!(cset82("defghijklmnopqrstuvwxyz").is_ok());
    }

    #[test]
    fn cset82_rejects_space() {
        assert_eq!(
            cset82("AB C"),
            Err(LintFailure::new(LintErr::InvalidCset82Character, 2, 1))
        );
        assert_eq!(
            cset82(" ABC"),
            Err(LintFailure::new(LintErr::InvalidCset82Character, 0, 1))
        );
    }

    #[test]
    fn cset39_rejects_underscore() {
        assert!(cset39("#-/0123456789ABCXYZ").is_ok());
        assert_eq!(
            cset39("ABC_"),
            Err(LintFailure::new(LintErr::InvalidCset39Character, 3, 1))
        );
    }

    #[test]
    fn cset64_padding_rules() {
        assert!(cset64("").is_ok());
        assert!(cset64("123").is_ok());
        assert!(cset64("12").is_ok()); // padding is optional
        assert!(cset64("12=").is_ok());
        assert!(cset64("1==").is_ok());

        assert_eq!(
            cset64("==="),
            Err(LintFailure::new(LintErr::InvalidCset64Padding, 0, 3))
        );
        assert_eq!(
            cset64("123="),
            Err(LintFailure::new(LintErr::InvalidCset64Padding, 3, 1))
        );
        assert_eq!(
            cset64("12=="),
            Err(LintFailure::new(LintErr::InvalidCset64Padding, 2, 2))
        );
    }

    #[test]
    fn cset64_charset() {
        assert!(cset64("ABCxyz0189-_").is_ok());
        assert_eq!(
            cset64("AB C"),
            Err(LintFailure::new(LintErr::InvalidCset64Character, 2, 1))
        );
        assert_eq!(
            cset64("ABC:123").unwrap_err().err,
            LintErr::InvalidCset64Character
        );
    }
}
