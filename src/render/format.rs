use chrono::{DateTime, Datelike, Timelike, Utc};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Groups thousands with spaces: `1234567` -> `1 234 567`.
pub fn format_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Rounds to the nearest integer before grouping.
pub fn format_decimal(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    format_number(value.round() as i64)
}

pub fn format_date(value: &DateTime<Utc>) -> String {
    format!(
        "{} {} {}, {:02}:{:02}",
        value.day(),
        MONTHS[value.month0() as usize],
        value.year(),
        value.hour(),
        value.minute()
    )
}

pub fn format_engine(engine_type: &str, engine_volume: f64) -> String {
    format!("{engine_type}, {engine_volume} l")
}
