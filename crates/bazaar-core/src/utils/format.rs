use chrono::{DateTime, Utc};

/// Truncate to at most `max_chars` characters, adding an ellipsis if needed
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        s.chars().take(max_chars).collect()
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", truncated.trim_end())
    }
}

pub fn format_date(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(dt) => dt.format("%b %d, %Y").to_string(),
        None => "-".to_string(),
    }
}

/// Two decimal places with the currency code in front; GHS when unknown.
pub fn format_money(amount: f64, currency: Option<&str>) -> String {
    format!("{} {:.2}", currency.unwrap_or("GHS"), amount)
}

pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{} B", bytes)
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Ça coûte cher", 6), "Ça...");
    }

    #[test]
    fn test_format_date() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(format_date(Some(&dt)), "Mar 09, 2024");
        assert_eq!(format_date(None), "-");
    }

    #[test]
    fn test_format_money_and_bytes() {
        assert_eq!(format_money(12.5, None), "GHS 12.50");
        assert_eq!(format_money(3.0, Some("USD")), "USD 3.00");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(50 * 1024 * 1024), "50.0 MiB");
    }
}
