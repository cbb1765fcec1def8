use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Highest day-of-month that exists in every month.
const HIGH_DAY_THRESHOLD: u32 = 28;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeInterval {
    pub every: u32,
    pub unit: TimeUnit,
}

impl TimeInterval {
    pub fn new(every: u32, unit: TimeUnit) -> Self {
        Self { every, unit }
    }

    /// Advances a calendar date by one step.
    ///
    /// Month and year steps apply the day-clamping policy: an anchor on the
    /// last day of its month, or on day 29-31, lands on the last day of the
    /// target month; any other day-of-month is kept as is. A step that cannot
    /// be represented returns `from` unchanged.
    pub fn next_date(&self, from: NaiveDate) -> NaiveDate {
        match self.unit {
            TimeUnit::Day => add_days(from, u64::from(self.every)),
            TimeUnit::Week => add_days(from, u64::from(self.every) * 7),
            TimeUnit::Month => shift_month_clamped(from, i64::from(self.every)).unwrap_or(from),
            TimeUnit::Year => shift_year_clamped(from, i64::from(self.every)).unwrap_or(from),
        }
    }

    /// Advances a timestamp by one step, keeping its time of day.
    pub fn next_timestamp(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        let date = self.next_date(from.date_naive());
        date.and_time(from.time()).and_utc()
    }

    /// Fixed length of one step, for units that have one.
    pub fn fixed_length(&self) -> Option<Duration> {
        match self.unit {
            TimeUnit::Day => Some(Duration::days(i64::from(self.every))),
            TimeUnit::Week => Some(Duration::weeks(i64::from(self.every))),
            TimeUnit::Month | TimeUnit::Year => None,
        }
    }

    /// Jumps `anchor` forward by whole steps to the last step at or before
    /// `target`. Only fixed-length units can jump; month and year steps are
    /// path dependent under clamping and return `anchor` untouched.
    pub fn fast_forward(&self, anchor: DateTime<Utc>, target: DateTime<Utc>) -> DateTime<Utc> {
        let Some(step) = self.fixed_length() else {
            return anchor;
        };
        let step_ms = step.num_milliseconds();
        let diff_ms = (target - anchor).num_milliseconds();
        if step_ms <= 0 || diff_ms <= 0 {
            return anchor;
        }
        let steps = diff_ms.div_euclid(step_ms);
        steps
            .checked_mul(step_ms)
            .map(Duration::milliseconds)
            .and_then(|offset| anchor.checked_add_signed(offset))
            .unwrap_or(anchor)
    }

    pub fn label(&self) -> String {
        match (self.every, &self.unit) {
            (1, TimeUnit::Day) => "Daily".into(),
            (1, TimeUnit::Week) => "Weekly".into(),
            (1, TimeUnit::Month) => "Monthly".into(),
            (1, TimeUnit::Year) => "Yearly".into(),
            (n, unit) => format!("Every {} {:?}{}", n, unit, if n > 1 { "s" } else { "" }),
        }
    }
}

fn add_days(from: NaiveDate, days: u64) -> NaiveDate {
    from.checked_add_days(Days::new(days)).unwrap_or(from)
}

fn shift_month_clamped(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let index = i64::from(date.year()) * 12 + i64::from(date.month0()) + months;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = index.rem_euclid(12) as u32 + 1;
    clamp_into(date, year, month)
}

fn shift_year_clamped(date: NaiveDate, years: i64) -> Option<NaiveDate> {
    let year = i32::try_from(i64::from(date.year()) + years).ok()?;
    clamp_into(date, year, date.month())
}

fn clamp_into(original: NaiveDate, year: i32, month: u32) -> Option<NaiveDate> {
    let day = original.day();
    let was_last_day = day == days_in_month(original.year(), original.month())?;
    let was_high_day = day > HIGH_DAY_THRESHOLD;
    let target_day = if was_last_day || was_high_day {
        days_in_month(year, month)?
    } else {
        day
    };
    NaiveDate::from_ymd_opt(year, month, target_day)
}

/// Number of days in the given month, `None` if the month is out of range.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    first_next.pred_opt().map(|last| last.day())
}
