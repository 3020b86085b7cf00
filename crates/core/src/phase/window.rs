//! Temporal containment of a phase inside its project.

use chrono::NaiveDate;

use crate::allocation::DateRangeViolation;
use crate::date::parse_iso_date;

/// Parses an optional phase date. Blank text means "no date".
///
/// # Errors
///
/// Returns `DateRangeViolation::Unparsable` for text that is not `YYYY-MM-DD`.
pub fn parse_phase_date(value: Option<&str>) -> Result<Option<NaiveDate>, DateRangeViolation> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_iso_date(text)
            .map(Some)
            .ok_or(DateRangeViolation::Unparsable),
    }
}

/// Checks that `[start, end]` is ordered and nests inside the project window.
///
/// Only complete pairs are checked: when either phase date is missing the
/// phase is accepted. Each project bound is enforced only when set.
///
/// # Errors
///
/// Returns the first violated rule.
pub fn check_containment(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    project_start: Option<NaiveDate>,
    project_due: Option<NaiveDate>,
) -> Result<(), DateRangeViolation> {
    let (Some(start), Some(end)) = (start, end) else {
        return Ok(());
    };

    if end < start {
        return Err(DateRangeViolation::EndBeforeStart);
    }
    if project_start.is_some_and(|p| start < p) {
        return Err(DateRangeViolation::StartsBeforeProject);
    }
    if project_due.is_some_and(|p| end > p) {
        return Err(DateRangeViolation::EndsAfterProject);
    }
    Ok(())
}
