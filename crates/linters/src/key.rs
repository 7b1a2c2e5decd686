//! GS1 key-shape linters.

use crate::{LintErr, LintFailure};

/// Currently the shortest GS1 Company Prefix is four digits.
const GCP_MIN_LENGTH: usize = 4;

const IMPORTER_IDX: &str =
    "-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// The component must start with a plausible GS1 Company Prefix: at least
/// [`GCP_MIN_LENGTH`] characters, the first [`GCP_MIN_LENGTH`] of which are
/// digits.
pub fn key(data: &str) -> Result<(), LintFailure> {
    let b = data.as_bytes();
    if b.len() < GCP_MIN_LENGTH {
        return Err(LintFailure::new(LintErr::TooShortForKey, 0, b.len()));
    }
    for (i, &c) in b[..GCP_MIN_LENGTH].iter().enumerate() {
        if !c.is_ascii_digit() {
            return Err(LintFailure::new(LintErr::InvalidGcpPrefix, i, 1));
        }
    }
    Ok(())
}

/// As [`key`], but the GS1 Company Prefix starts at the second character
/// (used by keys with a leading indicator or extension digit).
pub fn keyoff1(data: &str) -> Result<(), LintFailure> {
    if data.len() < 2 {
        return Err(LintFailure::new(LintErr::TooShortForKey, 0, data.len()));
    }
    key(&data[1..]).map_err(|f| LintFailure::new(f.err, f.pos + 1, f.len))
}

/// The component must contain at least one non-digit character.
pub fn hasnondigit(data: &str) -> Result<(), LintFailure> {
    if data.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LintFailure::new(
            LintErr::RequiresNonDigitCharacter,
            0,
            data.len(),
        ));
    }
    Ok(())
}

/// Single-character importer index from the file-safe URI set.
pub fn importeridx(data: &str) -> Result<(), LintFailure> {
    if let Some(pos) = data
        .bytes()
        .position(|b| !IMPORTER_IDX.bytes().any(|s| s == b))
    {
        return Err(LintFailure::new(LintErr::InvalidImportIdxCharacter, pos, 1));
    }
    Ok(())
}
