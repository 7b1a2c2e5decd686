//! Numeric-shape linters: zero rules, winding direction, piece-of-total
//! pairs and position-in-sequence values.

use crate::{LintErr, LintFailure};

/// The value must not be entirely zeros.
pub fn nonzero(data: &str) -> Result<(), LintFailure> {
    if !data.is_empty() && data.bytes().all(|b| b == b'0') {
        return Err(LintFailure::new(LintErr::IllegalZeroValue, 0, data.len()));
    }
    Ok(())
}

/// The value must be entirely zeros.
pub fn zero(data: &str) -> Result<(), LintFailure> {
    if data.bytes().any(|b| b != b'0') {
        return Err(LintFailure::new(LintErr::NotZero, 0, data.len()));
    }
    Ok(())
}

/// The value must not have a leading zero (single `0` is permitted).
pub fn nozeroprefix(data: &str) -> Result<(), LintFailure> {
    if data.len() > 1 && data.starts_with('0') {
        return Err(LintFailure::new(LintErr::IllegalZeroPrefix, 0, 1));
    }
    Ok(())
}

/// Winding direction: `0` (face out), `1` (face in) or `9` (undefined).
pub fn winding(data: &str) -> Result<(), LintFailure> {
    match data {
        "0" | "1" | "9" => Ok(()),
        _ => Err(LintFailure::new(
            LintErr::InvalidWindingDirection,
            0,
            data.len(),
        )),
    }
}

/// The value must be `0` or `1`.
pub fn yesno(data: &str) -> Result<(), LintFailure> {
    match data {
        "0" | "1" => Ok(()),
        _ => Err(LintFailure::new(LintErr::NotZeroOrOne, 0, data.len())),
    }
}

/// Even-length pair `PPTT` where piece number `PP` and total `TT` are both
/// nonzero and `PP <= TT`.
pub fn pieceoftotal(data: &str) -> Result<(), LintFailure> {
    let len = data.len();
    if len == 0 || len % 2 != 0 {
        return Err(LintFailure::new(
            LintErr::InvalidLengthForPieceOfTotal,
            0,
            len,
        ));
    }
    let half = len / 2;
    let (piece, total) = data.split_at(half);
    if piece.bytes().all(|b| b == b'0') {
        return Err(LintFailure::new(LintErr::ZeroPieceNumber, 0, half));
    }
    if total.bytes().all(|b| b == b'0') {
        return Err(LintFailure::new(LintErr::ZeroTotalPieces, half, half));
    }
    // Same width, so lexicographic compare is numeric compare.
    if piece > total {
        return Err(LintFailure::new(LintErr::PieceNumberExceedsTotal, 0, len));
    }
    Ok(())
}

/// Position within a sequence as `<pos>/<end>`: both parts nonempty digit
/// runs without zero prefixes, and `pos <= end`.
pub fn posinseqslash(data: &str) -> Result<(), LintFailure> {
    let len = data.len();
    let b = data.as_bytes();
    let pos = b.iter().take_while(|c| c.is_ascii_digit()).count();

    let malformed = pos == 0
        || pos + 1 >= len
        || b[pos] != b'/'
        || !b[pos + 1..].iter().all(|c| c.is_ascii_digit());
    if malformed {
        return Err(LintFailure::new(
            LintErr::PositionInSequenceMalformed,
            0,
            len,
        ));
    }

    let (p, e) = (&data[..pos], &data[pos + 1..]);
    if p.starts_with('0') {
        return Err(LintFailure::new(LintErr::IllegalZeroPrefix, 0, pos));
    }
    if e.starts_with('0') {
        return Err(LintFailure::new(
            LintErr::IllegalZeroPrefix,
            pos + 1,
            len - pos - 1,
        ));
    }
    // Compare by width first; equal widths compare lexicographically.
    let exceeds = p.len() > e.len() || (p.len() == e.len() && p > e);
    if exceeds {
        return Err(LintFailure::new(LintErr::PositionExceedsEnd, 0, len));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonzero_rules() {
        assert!(nonzero("0001").is_ok());
        assert!(nonzero("1000").is_ok());
        assert_eq!(nonzero("0000").unwrap_err().err, LintErr::IllegalZeroValue);
    }

    #[test]
    fn zero_rules() {
        assert!(zero("0").is_ok());
        assert!(zero("000").is_ok());
        assert_eq!(zero("1").unwrap_err().err, LintErr::NotZero);
        assert_eq!(zero("010").unwrap_err().err, LintErr::NotZero);
    }

    #[test]
    fn nozeroprefix_rules() {
        assert!(nozeroprefix("123").is_ok());
        assert!(nozeroprefix("0").is_ok());
        assert_eq!(
            nozeroprefix("023456789012").unwrap_err().err,
            LintErr::IllegalZeroPrefix
        );
    }

    #[test]
    fn winding_rules() {
        assert!(winding("0").is_ok());
        assert!(winding("1").is_ok());
        assert!(winding("9").is_ok());
        assert_eq!(
            winding("2").unwrap_err().err,
            LintErr::InvalidWindingDirection
        );
    }

    #[test]
    fn yesno_rules() {
        assert!(yesno("0").is_ok());
        assert!(yesno("1").is_ok());
        assert_eq!(yesno("2").unwrap_err().err, LintErr::NotZeroOrOne);
    }

    #[test]
    fn pieceoftotal_rules() {
        assert!(pieceoftotal("0102").is_ok());
        assert!(pieceoftotal("0303").is_ok());
        assert_eq!(
            pieceoftotal("0099").unwrap_err().err,
            LintErr::ZeroPieceNumber
        );
        assert_eq!(
            pieceoftotal("0100").unwrap_err().err,
            LintErr::ZeroTotalPieces
        );
        assert_eq!(
            pieceoftotal("0302").unwrap_err().err,
            LintErr::PieceNumberExceedsTotal
        );
        assert_eq!(
            pieceoftotal("123").unwrap_err().err,
            LintErr::InvalidLengthForPieceOfTotal
        );
    }

    #[test]
    fn posinseqslash_valid() {
        for v in ["1/1", "1/3", "3/3", "9/10", "10/10", "1/100", "998/999"] {
            assert!(posinseqslash(v).is_ok(), "{v} should pass");
        }
    }

    #[test]
    fn posinseqslash_malformed() {
        for v in ["", "/", "1", "x", "1/", "x/", "/1", "1/x", "111", "1/2/3"] {
            assert_eq!(
                posinseqslash(v).unwrap_err().err,
                LintErr::PositionInSequenceMalformed,
                "{v}"
            );
        }
    }

    #[test]
    fn posinseqslash_zero_prefix_and_order() {
        assert_eq!(
            posinseqslash("0/3").unwrap_err().err,
            LintErr::IllegalZeroPrefix
        );
        assert_eq!(
            posinseqslash("1/03").unwrap_err().err,
            LintErr::IllegalZeroPrefix
        );
        assert_eq!(
            posinseqslash("2/1").unwrap_err().err,
            LintErr::PositionExceedsEnd
        );
        assert_eq!(
            posinseqslash("10/9").unwrap_err().err,
            LintErr::PositionExceedsEnd
        );
    }
}
