//! Small string and date helpers shared by the parser and the page generator

use once_cell::sync::Lazy;
use regex::Regex;

const MS_PER_DAY: i64 = 86_400_000;

const WEEKDAYS: [&str; 7] = [
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
];

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

/// `YYYY-MM-DD` with an optional `THH:MM(:SS)` part, as found in core properties
static W3C_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{4})-(\d{2})-(\d{2})(?:[T ](\d{2}):(\d{2})(?::(\d{2}))?)?").unwrap()
});

/// Pad a number with leading zeros up to `width` digits
pub fn zero_pad(number: usize, width: usize) -> String {
    format!("{number:0width$}")
}

/// Lowercase, dash-separated identifier for a post, e.g. `My First_Post` -> `my-first-post`
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }

    slug
}

/// Element id for a section heading: keep letters, digits and spaces, then
/// turn spaces into dashes.
pub fn section_anchor(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect::<String>()
        .replace(' ', "-")
        .to_lowercase()
}

/// Parse a W3C datetime (`2024-03-05T10:00:00Z`) into milliseconds since the
/// Unix epoch. Time zone offsets are ignored.
pub fn parse_w3c_datetime(value: &str) -> Option<i64> {
    let caps = W3C_DATETIME.captures(value)?;
    let field = |i: usize| -> Option<i64> {
        caps.get(i)
            .map(|m| m.as_str().parse::<i64>().ok())
            .unwrap_or(Some(0))
    };

    let year = field(1)?;
    let month = field(2)?;
    let day = field(3)?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    let seconds = field(4)? * 3600 + field(5)? * 60 + field(6)?;
    Some(days_from_civil(year, month, day) * MS_PER_DAY + seconds * 1000)
}

/// Format a timestamp the way post headers show it: `Thursday, October 06, 2022`
pub fn format_long_date(timestamp_ms: i64) -> String {
    let days = timestamp_ms.div_euclid(MS_PER_DAY);
    let (year, month, day) = civil_from_days(days);
    // 1970-01-01 was a Thursday
    let weekday = WEEKDAYS[days.rem_euclid(7) as usize];
    let month_name = MONTHS[(month - 1) as usize];
    format!("{weekday}, {month_name} {day:02}, {year}")
}

/// Days since 1970-01-01 for a proleptic Gregorian date
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
