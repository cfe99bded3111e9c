//! Gap calendar — decides which calendar dates a dataset's schedule skips.
//!
//! Datasets can declare exception days ("no update expected on weekends /
//! holidays / ...") that delay the effective reference date used by the
//! lateness calculator. The descriptor vocabulary is closed: anything the
//! parser does not recognize is a validation error, never a silent no-op.

use std::cell::RefCell;
use std::collections::HashMap;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

use crate::error::CoreError;

/// One gap descriptor attached to a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapRule {
    /// Saturdays and Sundays.
    Weekend,
    /// A single weekday ("Saturdays", "Sundays", "Mondays").
    SpecificWeekday(Weekday),
    /// The portal's observed-holiday list.
    Holiday,
    /// "yesterday" — not a calendar predicate. Updates reflect the prior
    /// day's data, so one day is subtracted from positive lateness after
    /// the fact (see the lateness calculator).
    DayLagBuffer,
}

impl FromStr for GapRule {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekends" => Ok(GapRule::Weekend),
            "Saturdays" => Ok(GapRule::SpecificWeekday(Weekday::Sat)),
            "Sundays" => Ok(GapRule::SpecificWeekday(Weekday::Sun)),
            "Mondays" => Ok(GapRule::SpecificWeekday(Weekday::Mon)),
            "holidays" => Ok(GapRule::Holiday),
            "yesterday" => Ok(GapRule::DayLagBuffer),
            other => Err(CoreError::UnknownGapDescriptor(other.to_string())),
        }
    }
}

/// Evaluates gap rules against concrete dates.
///
/// Holds a per-year cache of the computed holiday list. Construct one per
/// scan pass; the holiday rules are fixed US federal-style observances.
pub struct GapCalendar {
    holiday_cache: RefCell<HashMap<i32, Vec<NaiveDate>>>,
}

impl GapCalendar {
    pub fn new() -> Self {
        Self {
            holiday_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Whether `date` matches any of the dataset's gap rules.
    ///
    /// `DayLagBuffer` never matches a date; it is applied to the computed
    /// lateness instead.
    pub fn matches(&self, date: NaiveDate, rules: &[GapRule]) -> bool {
        rules.iter().any(|rule| match rule {
            GapRule::Weekend => {
                matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
            }
            GapRule::SpecificWeekday(day) => date.weekday() == *day,
            GapRule::Holiday => self.is_holiday(date),
            GapRule::DayLagBuffer => false,
        })
    }

    /// Advance a reference timestamp one day at a time while its date still
    /// matches a gap rule. Idempotent for timestamps already past all gaps.
    pub fn advance_past_gaps(
        &self,
        reference: NaiveDateTime,
        rules: &[GapRule],
    ) -> NaiveDateTime {
        let mut adjusted = reference;
        while self.matches(adjusted.date(), rules) {
            adjusted = adjusted + Duration::days(1);
        }
        adjusted
    }

    fn is_holiday(&self, date: NaiveDate) -> bool {
        let mut cache = self.holiday_cache.borrow_mut();
        let holidays = cache
            .entry(date.year())
            .or_insert_with(|| holidays_for_year(date.year()));
        holidays.contains(&date)
    }

    /// The computed holiday list for a year (cached copy).
    pub fn holidays(&self, year: i32) -> Vec<NaiveDate> {
        self.holiday_cache
            .borrow_mut()
            .entry(year)
            .or_insert_with(|| holidays_for_year(year))
            .clone()
    }
}

impl Default for GapCalendar {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the holiday list for one year: four fixed dates plus five
/// rule-based observances.
fn holidays_for_year(year: i32) -> Vec<NaiveDate> {
    let ymd = |m, d| {
        // Months/days are constants below, always valid.
        NaiveDate::from_ymd_opt(year, m, d).unwrap_or(NaiveDate::MIN)
    };
    vec![
        ymd(1, 1),                                        // New Year's Day
        nth_weekday_of_month(year, 1, Weekday::Mon, 3),   // MLK Day
        easter_sunday(year) - Duration::days(2),          // Good Friday
        last_weekday_of_month(year, 5, Weekday::Mon),     // Memorial Day
        ymd(7, 4),                                        // Independence Day
        nth_weekday_of_month(year, 9, Weekday::Mon, 1),   // Labor Day
        ymd(11, 11),                                      // Veterans Day
        nth_weekday_of_month(year, 11, Weekday::Thu, 4),  // Thanksgiving
        ymd(12, 25),                                      // Christmas
    ]
}

/// The `n`th occurrence of `weekday` in the given month (1-based).
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u32) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN);
    let offset = (weekday.num_days_from_monday() + 7
        - first.weekday().num_days_from_monday())
        % 7;
    first + Duration::days(i64::from(offset) + 7 * (i64::from(n) - 1))
}

/// The last occurrence of `weekday` in the given month.
pub fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .unwrap_or(NaiveDate::MIN);
    let last = first_of_next - Duration::days(1);
    let offset = (last.weekday().num_days_from_monday() + 7
        - weekday.num_days_from_monday())
        % 7;
    last - Duration::days(i64::from(offset))
}

/// Easter Sunday by the anonymous Gregorian computus.
pub fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32).unwrap_or(NaiveDate::MIN)
}
