//! Date and time component linters.
//!
//! All components are already guaranteed numeric by the cset linter that
//! runs first; these linters only police field ranges.

use crate::{LintErr, LintFailure};

fn two(b: &[u8], at: usize) -> u32 {
    u32::from(b[at] - b'0') * 10 + u32::from(b[at + 1] - b'0')
}

/// Days in `month` for a two-digit year, with the GS1 leap-year convention
/// (any year divisible by four).
fn days_in_month(yy: u32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if yy % 4 == 0 {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

fn lint_date(data: &str, day_zero_ok: bool) -> Result<(), LintFailure> {
    let b = data.as_bytes();
    if b.len() < 6 {
        return Err(LintFailure::new(LintErr::DateTooShort, 0, b.len()));
    }
    if b.len() > 6 {
        return Err(LintFailure::new(LintErr::DateTooLong, 0, b.len()));
    }

    let yy = two(b, 0);
    let mm = two(b, 2);
    let dd = two(b, 4);

    if !(1..=12).contains(&mm) {
        return Err(LintFailure::new(LintErr::IllegalMonth, 2, 2));
    }
    if dd == 0 {
        if !day_zero_ok {
            return Err(LintFailure::new(LintErr::IllegalDay, 4, 2));
        }
    } else if dd > days_in_month(yy, mm) {
        return Err(LintFailure::new(LintErr::IllegalDay, 4, 2));
    }
    Ok(())
}

/// `YYMMDD` date.
pub fn yymmdd(data: &str) -> Result<(), LintFailure> {
    lint_date(data, false)
}

/// `YYMMDD` date where `DD` may be `00`, meaning end of month.
pub fn yymmd0(data: &str) -> Result<(), LintFailure> {
    lint_date(data, true)
}

/// `YYMMDDHH` date with hour.
pub fn yymmddhh(data: &str) -> Result<(), LintFailure> {
    let b = data.as_bytes();
    if b.len() < 8 {
        return Err(LintFailure::new(LintErr::DateTooShort, 0, b.len()));
    }
    if b.len() > 8 {
        return Err(LintFailure::new(LintErr::DateTooLong, 0, b.len()));
    }
    lint_date(&data[..6], false)?;
    if two(b, 6) > 23 {
        return Err(LintFailure::new(LintErr::IllegalHour, 6, 2));
    }
    Ok(())
}

/// `MM` minutes with optional `SS` seconds (`MM` or `MMSS`).
pub fn mmoptss(data: &str) -> Result<(), LintFailure> {
    let b = data.as_bytes();
    match b.len() {
        0 | 1 => return Err(LintFailure::new(LintErr::MinuteTooShort, 0, b.len())),
        2 => {}
        3 => return Err(LintFailure::new(LintErr::SecondTooShort, 2, 1)),
        4 => {}
        n => return Err(LintFailure::new(LintErr::SecondTooLong, 4, n - 4)),
    }
    if two(b, 0) > 59 {
        return Err(LintFailure::new(LintErr::IllegalMinute, 0, 2));
    }
    if b.len() == 4 && two(b, 2) > 59 {
        return Err(LintFailure::new(LintErr::IllegalSecond, 2, 2));
    }
    Ok(())
}
