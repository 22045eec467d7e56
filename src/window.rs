//! Retention window expressions such as `30d`, `6m` or `1y`.
//!
//! A window is `<integer><unit>` where the unit is one of `d` (days),
//! `m` (months) or `y` (years). Month and year windows use calendar
//! arithmetic: one month before March 31st is the last day of February.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, Months, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{RetentionError, Result};

lazy_static! {
    static ref WINDOW_REGEX: Regex = Regex::new(r"^([0-9]+)([dmy])$").unwrap();
}

const EXPECTED_FORMAT: &str = "expected <number><d|m|y>, e.g. 30d, 6m or 1y";

/// Calendar unit of a retention window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowUnit {
    Days,
    Months,
    Years,
}

impl WindowUnit {
    fn suffix(self) -> char {
        match self {
            WindowUnit::Days => 'd',
            WindowUnit::Months => 'm',
            WindowUnit::Years => 'y',
        }
    }
}

/// A parsed retention window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionWindow {
    pub amount: u32,
    pub unit: WindowUnit,
}

impl RetentionWindow {
    pub fn new(amount: u32, unit: WindowUnit) -> Self {
        RetentionWindow { amount, unit }
    }

    /// The instant `amount` calendar units before `now`.
    ///
    /// Fails only when the result falls outside the representable range.
    pub fn cutoff_from(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let cutoff = match self.unit {
            WindowUnit::Days => now.checked_sub_days(Days::new(u64::from(self.amount))),
            WindowUnit::Months => now.checked_sub_months(Months::new(self.amount)),
            WindowUnit::Years => self
                .amount
                .checked_mul(12)
                .and_then(|months| now.checked_sub_months(Months::new(months))),
        };

        cutoff.ok_or_else(|| {
            RetentionError::retention_format(self.to_string(), "window reaches beyond the calendar")
        })
    }
}

impl FromStr for RetentionWindow {
    type Err = RetentionError;

    fn from_str(expression: &str) -> Result<Self> {
        let captures = WINDOW_REGEX
            .captures(expression)
            .ok_or_else(|| RetentionError::retention_format(expression, EXPECTED_FORMAT))?;

        let amount = captures[1]
            .parse::<u32>()
            .map_err(|_| RetentionError::retention_format(expression, "number is too large"))?;

        let unit = match &captures[2] {
            "d" => WindowUnit::Days,
            "m" => WindowUnit::Months,
            _ => WindowUnit::Years,
        };

        Ok(RetentionWindow { amount, unit })
    }
}

impl fmt::Display for RetentionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

/// Resolves `expression` to an absolute cutoff relative to the current time.
pub fn resolve(expression: &str) -> Result<DateTime<Utc>> {
    resolve_at(expression, Utc::now())
}

/// Resolves `expression` to an absolute cutoff relative to `now`.
pub fn resolve_at(expression: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    expression.parse::<RetentionWindow>()?.cutoff_from(now)
}
