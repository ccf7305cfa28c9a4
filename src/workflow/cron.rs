//! Five-field cron schedules, evaluated in UTC

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// How far ahead `next_after` searches before giving up
const SEARCH_HORIZON_DAYS: i64 = 366 * 4;

/// Error types for cron parsing
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CronError {
    #[error("cron expression must have 5 fields, got {0}")]
    FieldCount(usize),

    #[error("invalid {field} field '{value}': {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
}

const MINUTE: FieldSpec = FieldSpec { name: "minute", min: 0, max: 59 };
const HOUR: FieldSpec = FieldSpec { name: "hour", min: 0, max: 23 };
const DAY_OF_MONTH: FieldSpec = FieldSpec { name: "day-of-month", min: 1, max: 31 };
const MONTH: FieldSpec = FieldSpec { name: "month", min: 1, max: 12 };
// 7 is accepted as an alias for Sunday
const DAY_OF_WEEK: FieldSpec = FieldSpec { name: "day-of-week", min: 0, max: 7 };

/// Allowed values of one cron field
#[derive(Debug, Clone, PartialEq, Eq)]
struct CronField {
    values: BTreeSet<u32>,
    unrestricted: bool,
    /// Written starting with `*`
    star: bool,
}

impl CronField {
    fn parse(spec: FieldSpec, text: &str) -> Result<Self, CronError> {
        let invalid = |reason: &str| CronError::InvalidField {
            field: spec.name,
            value: text.to_string(),
            reason: reason.to_string(),
        };

        let mut values = BTreeSet::new();
        for part in text.split(',') {
            let (range, step) = match part.split_once('/') {
                Some((range, step)) => {
                    let step: u32 = step.parse().map_err(|_| invalid("step is not a number"))?;
                    if step == 0 {
                        return Err(invalid("step must be positive"));
                    }
                    (range, Some(step))
                }
                None => (part, None),
            };

            let (start, end) = if range == "*" {
                (spec.min, spec.max)
            } else if let Some((a, b)) = range.split_once('-') {
                let a: u32 = a.parse().map_err(|_| invalid("range start is not a number"))?;
                let b: u32 = b.parse().map_err(|_| invalid("range end is not a number"))?;
                (a, b)
            } else {
                let a: u32 = range.parse().map_err(|_| invalid("value is not a number"))?;
                // `a/n` means every n-th value from a
                if step.is_some() {
                    (a, spec.max)
                } else {
                    (a, a)
                }
            };

            if start < spec.min || end > spec.max {
                return Err(invalid(&format!(
                    "values must be between {} and {}",
                    spec.min, spec.max
                )));
            }
            if start > end {
                return Err(invalid("range start is after range end"));
            }

            values.extend((start..=end).step_by(step.unwrap_or(1) as usize));
        }

        if spec.name == DAY_OF_WEEK.name && values.remove(&7) {
            values.insert(0);
        }

        let span = if spec.name == DAY_OF_WEEK.name { 7 } else { spec.max - spec.min + 1 };
        let unrestricted = values.len() as u32 == span;

        Ok(Self {
            values,
            unrestricted,
            star: text.starts_with('*'),
        })
    }

    fn contains(&self, value: u32) -> bool {
        self.values.contains(&value)
    }

    fn only(&self, value: u32) -> bool {
        self.values.len() == 1 && self.values.contains(&value)
    }
}

/// A parsed cron schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    expression: String,
    minutes: CronField,
    hours: CronField,
    days_of_month: CronField,
    months: CronField,
    days_of_week: CronField,
}

impl CronSchedule {
    /// Parse a five-field cron expression
    pub fn parse(expression: &str) -> Result<Self, CronError> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(CronError::FieldCount(fields.len()));
        }

        Ok(Self {
            expression: fields.join(" "),
            minutes: CronField::parse(MINUTE, fields[0])?,
            hours: CronField::parse(HOUR, fields[1])?,
            days_of_month: CronField::parse(DAY_OF_MONTH, fields[2])?,
            months: CronField::parse(MONTH, fields[3])?,
            days_of_week: CronField::parse(DAY_OF_WEEK, fields[4])?,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Whether the schedule fires once a day at `hour:minute` UTC
    pub fn is_daily_at(&self, hour: u32, minute: u32) -> bool {
        self.minutes.only(minute) && self.hours.only(hour) && self.months.unrestricted && self.every_day()
    }

    fn every_day(&self) -> bool {
        let (dom, dow) = (&self.days_of_month, &self.days_of_week);
        if dom.star || dow.star {
            dom.unrestricted && dow.unrestricted
        } else {
            dom.unrestricted || dow.unrestricted
        }
    }

    /// Whether the schedule fires at the minute containing `at`
    pub fn matches(&self, at: DateTime<Utc>) -> bool {
        self.minutes.contains(at.minute())
            && self.hours.contains(at.hour())
            && self.months.contains(at.month())
            && self.day_matches(at.date_naive())
    }

    /// The first firing strictly after `after`
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let limit = after + Duration::days(SEARCH_HORIZON_DAYS);
        let mut t = after.with_nanosecond(0)?.with_second(0)? + Duration::minutes(1);

        while t <= limit {
            if !self.months.contains(t.month()) {
                t = start_of_next_month(t)?;
                continue;
            }
            if !self.day_matches(t.date_naive()) {
                t = start_of_day(t)? + Duration::days(1);
                continue;
            }
            if !self.hours.contains(t.hour()) {
                t = t.with_minute(0)? + Duration::hours(1);
                continue;
            }
            if !self.minutes.contains(t.minute()) {
                t += Duration::minutes(1);
                continue;
            }
            return Some(t);
        }

        None
    }

    /// The next `count` firings after `after`
    pub fn upcoming(&self, after: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        let mut runs = Vec::with_capacity(count);
        let mut cursor = after;
        while runs.len() < count {
            match self.next_after(cursor) {
                Some(next) => {
                    runs.push(next);
                    cursor = next;
                }
                None => break,
            }
        }
        runs
    }

    // Unless one day field starts with `*`, either day field may match
    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = self.days_of_month.contains(date.day());
        let dow = self
            .days_of_week
            .contains(date.weekday().num_days_from_sunday());

        if self.days_of_month.star || self.days_of_week.star {
            dom && dow
        } else {
            dom || dow
        }
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

impl Serialize for CronSchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.expression)
    }
}

fn start_of_day(t: DateTime<Utc>) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(t.year(), t.month(), t.day(), 0, 0, 0).single()
}

fn start_of_next_month(t: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let (year, month) = if t.month() == 12 {
        (t.year() + 1, 1)
    } else {
        (t.year(), t.month() + 1)
    };
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()
}
