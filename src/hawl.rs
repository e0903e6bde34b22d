//! # Hawl (Holding Year) Recurrence
//!
//! Zakat falls due each time a full year has passed since wealth first
//! reached nisab (the anchor date).
//!
//! - **Gregorian**: the anchor's month/day in the current year, or the next
//!   year if that day is not strictly after today. A Feb 29 anchor lands on
//!   Mar 1 in non-leap years.
//! - **Hijri**: the anchor plus whole multiples of a fixed 354-day lunar year.
//!   This is a deliberate approximation, not a Hijri calendar conversion.

use chrono::{Datelike, Duration, Local, NaiveDate};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::CalendarSystem;
use crate::types::ZakatError;

/// Approximate length of a lunar year in days.
pub const LUNAR_YEAR_DAYS: i64 = 354;

/// The next recurrence of the Hawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DueDate {
    pub gregorian: NaiveDate,
    /// Whole days from the reference date; always at least 1.
    pub days_remaining: i64,
}

/// Computes the next due date strictly after `today`.
pub fn calculate_next_due_date(
    anchor: NaiveDate,
    calendar: CalendarSystem,
    today: NaiveDate,
) -> Result<DueDate, ZakatError> {
    let next = match calendar {
        CalendarSystem::Gregorian => {
            let this_year = anniversary_in(anchor, today.year())?;
            if this_year > today {
                this_year
            } else {
                anniversary_in(anchor, today.year() + 1)?
            }
        }
        CalendarSystem::Hijri => {
            if anchor > today {
                anchor
            } else {
                let cycles = (today - anchor).num_days() / LUNAR_YEAR_DAYS + 1;
                anchor
                    .checked_add_signed(Duration::days(cycles * LUNAR_YEAR_DAYS))
                    .ok_or_else(|| ZakatError::overflow("advancing lunar due date"))?
            }
        }
    };

    Ok(DueDate {
        gregorian: next,
        days_remaining: (next - today).num_days(),
    })
}

/// The anchor's month/day in `year`; Feb 29 rolls over to Mar 1.
fn anniversary_in(anchor: NaiveDate, year: i32) -> Result<NaiveDate, ZakatError> {
    anchor
        .with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .ok_or_else(|| ZakatError::overflow("advancing solar due date"))
}

/// Tracks the Hawl cycle for an anchor date relative to a reference day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HawlTracker {
    pub anchor: NaiveDate,
    pub calendar: CalendarSystem,
    /// The reference date (defaults to today).
    pub calculation_date: NaiveDate,
}

impl HawlTracker {
    pub fn new(anchor: NaiveDate, calendar: CalendarSystem) -> Self {
        Self {
            anchor,
            calendar,
            calculation_date: Local::now().date_naive(),
        }
    }

    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.calculation_date = date;
        self
    }

    pub fn next_due(&self) -> Result<DueDate, ZakatError> {
        calculate_next_due_date(self.anchor, self.calendar, self.calculation_date)
    }

    /// Length of the cycle ending at `next_due`, in days.
    fn cycle_length(&self, next_due: NaiveDate) -> i64 {
        match self.calendar {
            CalendarSystem::Hijri => LUNAR_YEAR_DAYS,
            CalendarSystem::Gregorian => anniversary_in(self.anchor, next_due.year() - 1)
                .map(|previous| (next_due - previous).num_days())
                .unwrap_or(365),
        }
    }

    /// Fraction (0.0 to 1.0) of the current cycle already elapsed.
    ///
    /// Zero while the anchor itself is still in the future.
    pub fn completion_percentage(&self) -> Result<Decimal, ZakatError> {
        if self.anchor > self.calculation_date {
            return Ok(Decimal::ZERO);
        }
        let due = self.next_due()?;
        let length = self.cycle_length(due.gregorian).max(1);
        let elapsed = (length - due.days_remaining).clamp(0, length);
        Ok(Decimal::from(elapsed) / Decimal::from(length))
    }

    /// Whether at least one full cycle has passed since the anchor.
    pub fn is_satisfied(&self) -> bool {
        match self.calendar {
            CalendarSystem::Hijri => (self.calculation_date - self.anchor).num_days() >= LUNAR_YEAR_DAYS,
            CalendarSystem::Gregorian => anniversary_in(self.anchor, self.anchor.year() + 1)
                .map(|first| self.calculation_date >= first)
                .unwrap_or(false),
        }
    }
}
