//! Customer value tiers and birthday reminders.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Customer segment by lifetime spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerTier {
    Vip,
    Premium,
    Regular,
    New,
}

pub const VIP_THRESHOLD: f64 = 1000.0;
pub const PREMIUM_THRESHOLD: f64 = 500.0;
pub const REGULAR_THRESHOLD: f64 = 100.0;

/// Tier for a customer who has spent `total_spent` (non-cancelled sales).
pub fn classify_customer(total_spent: f64) -> CustomerTier {
    if total_spent >= VIP_THRESHOLD {
        CustomerTier::Vip
    } else if total_spent >= PREMIUM_THRESHOLD {
        CustomerTier::Premium
    } else if total_spent >= REGULAR_THRESHOLD {
        CustomerTier::Regular
    } else {
        CustomerTier::New
    }
}

/// Default look-ahead window for upcoming birthdays.
pub const DEFAULT_BIRTHDAY_WINDOW_DAYS: i64 = 30;

/// Next occurrence of a birthday on or after `today`.
///
/// February 29 birthdays fall on February 28 in non-leap years.
pub fn next_birthday(birth_date: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let in_year = |year: i32| {
        NaiveDate::from_ymd_opt(year, birth_date.month(), birth_date.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, birth_date.month(), birth_date.day() - 1))
    };
    let this_year = in_year(today.year())?;
    if this_year >= today {
        Some(this_year)
    } else {
        in_year(today.year() + 1)
    }
}
