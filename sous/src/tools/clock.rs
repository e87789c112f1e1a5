//! Wall-clock answers.

use chrono::{DateTime, Datelike, TimeZone};

/// `"03:07 PM"`
pub fn format_time<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%I:%M %p").to_string()
}

/// `"Friday, March 1st, 2024"`
pub fn format_date<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let day = now.day();
    format!(
        "{}, {} {day}{}, {}",
        now.format("%A"),
        now.format("%B"),
        ordinal_suffix(day),
        now.year()
    )
}

const fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
