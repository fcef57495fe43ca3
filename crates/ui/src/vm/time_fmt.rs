use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

/// Short calendar date, e.g. `Nov 14, 2023`.
#[must_use]
pub fn format_date(value: DateTime<Utc>) -> String {
    value.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aarambh_core::time::fixed_now;

    #[test]
    fn short_date_drops_time_of_day() {
        assert_eq!(format_date(fixed_now()), "Nov 14, 2023");
        assert!(format_datetime(fixed_now()).starts_with("2023-11-14T22:13:20"));
    }
}
