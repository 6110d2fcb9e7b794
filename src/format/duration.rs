use super::color::cyan;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_DAY: u64 = 86400;

/// Render a number of seconds as days, hours, minutes and seconds
///
/// Zero days/hours/minutes are left out; seconds are always present, so
/// `0` renders as `0 second`.
pub fn format_duration(secs: u64) -> String {
    let days = secs / SECONDS_PER_DAY;
    let hours = (secs % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    let minutes = (secs / SECONDS_PER_MINUTE) % 60;
    let seconds = secs % SECONDS_PER_MINUTE;

    let mut terms: Vec<String> = [(days, "day"), (hours, "hour"), (minutes, "minute")]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format_unit(value, unit))
        .collect();
    terms.push(format_unit(seconds, "second"));

    terms.join(", ")
}

/// `<value> <unit>` with the unit pluralized and colored
pub fn format_unit(value: u64, unit: &str) -> String {
    format!("{} {}", value, plural(value, unit))
}

fn plural(value: u64, unit: &str) -> String {
    if value > 1 {
        cyan(&format!("{}s", unit))
    } else {
        cyan(unit)
    }
}
