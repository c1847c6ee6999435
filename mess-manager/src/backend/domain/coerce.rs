//! Read-boundary coercion of untyped document values.
//!
//! Stored documents can carry anything: missing fields, numbers saved as
//! text, nulls. Everything is normalised here before it reaches the ledger,
//! so arithmetic never sees a non-finite value and the display never shows
//! `NaN`.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

/// Coerce a stored value to a finite number, 0 when it is missing or not numeric
pub fn safe_num(value: Option<&Value>) -> f64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    number.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Coerce a stored value to text; numbers keep their decimal form, anything else is empty
pub fn safe_str(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// A stored flag is set only when it is literally `true`
pub fn safe_bool(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

/// Format a stored date (RFC 3339 timestamp or YYYY-MM-DD) as DD/MM/YYYY
///
/// Returns an empty string when the value cannot be read as a date.
pub fn display_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return timestamp.format("%d/%m/%Y").to_string();
    }

    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => String::new(),
    }
}

/// Round to two decimals for display
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

/// Two-decimal money text; non-finite values render as 0.00
pub fn format_money(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let formatted = format!("{:.2}", value);
    // Avoid "-0.00" for tiny negative values
    if formatted == "-0.00" {
        "0.00".to_string()
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_safe_num_handles_garbage() {
        assert_eq!(safe_num(None), 0.0);
        assert_eq!(safe_num(Some(&Value::Null)), 0.0);
        assert_eq!(safe_num(Some(&json!("abc"))), 0.0);
        assert_eq!(safe_num(Some(&json!("NaN"))), 0.0);
        assert_eq!(safe_num(Some(&json!("inf"))), 0.0);
        assert_eq!(safe_num(Some(&json!({"nested": 1}))), 0.0);
        assert_eq!(safe_num(Some(&json!([1, 2]))), 0.0);
        assert_eq!(safe_num(Some(&json!(""))), 0.0);
    }

    #[test]
    fn test_safe_num_accepts_numeric_text() {
        assert_eq!(safe_num(Some(&json!(2.5))), 2.5);
        assert_eq!(safe_num(Some(&json!(" 150 "))), 150.0);
        assert_eq!(safe_num(Some(&json!("1.5"))), 1.5);
        assert_eq!(safe_num(Some(&json!(true))), 1.0);
    }

    #[test]
    fn test_safe_str() {
        assert_eq!(safe_str(Some(&json!("Karim"))), "Karim");
        assert_eq!(safe_str(Some(&json!(42))), "42");
        assert_eq!(safe_str(Some(&json!(null))), "");
        assert_eq!(safe_str(Some(&json!({"a": 1}))), "");
        assert_eq!(safe_str(None), "");
    }

    #[test]
    fn test_safe_bool() {
        assert!(safe_bool(Some(&json!(true))));
        assert!(!safe_bool(Some(&json!(false))));
        assert!(!safe_bool(Some(&json!("true"))));
        assert!(!safe_bool(None));
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2024-05-03"), "03/05/2024");
        assert_eq!(display_date("2024-05-03T10:15:00Z"), "03/05/2024");
        assert_eq!(display_date("2024-05-03T10:15:00.123+06:00"), "03/05/2024");
        assert_eq!(display_date("yesterday"), "");
        assert_eq!(display_date(""), "");
    }

    #[test]
    fn test_rounding_and_formatting() {
        assert_eq!(round2(500.0 / 104.0), 4.81);
        assert_eq!(round2(f64::NAN), 0.0);
        assert_eq!(format_money(4.8076), "4.81");
        assert_eq!(format_money(f64::INFINITY), "0.00");
        assert_eq!(format_money(-0.001), "0.00");
        assert_eq!(format_money(-90.0), "-90.00");
    }
}
