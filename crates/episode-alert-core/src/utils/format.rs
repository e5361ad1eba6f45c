use chrono::{DateTime, NaiveDate};

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an air date string to a more readable format
pub fn format_air_date(date: &str) -> String {
    if date.is_empty() {
        return "TBA".to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        day.format("%b %d, %Y").to_string()
    } else {
        date.to_string()
    }
}

/// Zero-pad a countdown component to two digits
pub fn pad2(value: i64) -> String {
    if (0..10).contains(&value) {
        format!("0{}", value)
    } else {
        value.to_string()
    }
}
