use chrono::{Local, NaiveDate};

/// Base phrase followed by the date, e.g. `"... ポンド 2025-03-14"`.
pub fn build_query(base: &str, date: NaiveDate) -> String {
    format!("{} {}", base.trim_end(), date.format("%Y-%m-%d"))
}

/// Query stamped with today's local date.
pub fn current_query(base: &str) -> String {
    build_query(base, Local::now().date_naive())
}
