use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

pub const MISSING_TIME: &str = "--:--:---";
pub const NOT_AVAILABLE: &str = "N/A";

/// Lap or sector time as `m:ss.mmm`. Missing, zero and non-finite times show as `--:--:---`.
pub fn format_lap_time(seconds: Option<f64>) -> String {
    let seconds = match seconds {
        Some(s) if s.is_finite() && s != 0. => s,
        _ => return MISSING_TIME.to_string(),
    };

    let sign = if seconds < 0. { "-" } else { "" };
    // split into minutes only after rounding to whole milliseconds
    let total_ms = (seconds.abs() * 1000.).round() as u64;
    let mins = total_ms / 60_000;
    let secs = (total_ms % 60_000) as f64 / 1000.;
    format!("{}{}:{:06.3}", sign, mins, secs)
}

pub fn format_top_speed(speed: Option<f64>) -> String {
    match speed {
        Some(s) if s.is_finite() && s != 0. => format!("{:.1} km/h", s),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_temperature(celsius: Option<f64>) -> String {
    celsius
        .map(|c| format!("{}°C", c))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_humidity(humidity: Option<f64>) -> String {
    humidity
        .map(|h| format!("{}%", h))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_consistency(consistency: Option<f64>) -> String {
    format!("{:.1}%", consistency.unwrap_or(0.))
}

pub fn format_laps_count(valid_laps: u32, total_laps: u32) -> String {
    format!("{}/{} laps", valid_laps, total_laps)
}

/// `sector_1` -> `SECTOR 1`
pub fn sector_label(key: &str) -> String {
    key.replacen('_', " ", 1).to_uppercase()
}

fn parse_timestamp(timestamp: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(timestamp, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Session creation date. Unparseable timestamps are shown as sent.
pub fn format_date(timestamp: Option<&str>) -> String {
    match timestamp {
        Some(ts) => parse_timestamp(ts)
            .map(|dt| dt.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| ts.to_string()),
        None => String::new(),
    }
}

pub fn format_datetime(timestamp: Option<&str>) -> String {
    match timestamp {
        Some(ts) => parse_timestamp(ts)
            .map(|dt| dt.format("%d/%m/%Y %H:%M:%S").to_string())
            .unwrap_or_else(|| ts.to_string()),
        None => String::new(),
    }
}
