use chrono::NaiveDateTime;

/// 報價時間的格式，例如 "01/01/2024 09:00"
const QUOTE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Parses a quote timestamp in `DD/MM/YYYY HH:MM` format.
///
/// Returns `None` when the string does not match the format exactly.
pub fn parse_quote_time(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, QUOTE_TIME_FORMAT).ok()
}

/// Formats the clock hour of `now` as `YYmmddHH`.
///
/// Two calls within the same clock hour return the same value.
pub fn hour_stamp(now: NaiveDateTime) -> String {
    now.format("%y%m%d%H").to_string()
}
