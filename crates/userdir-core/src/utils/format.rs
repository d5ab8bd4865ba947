use chrono::{DateTime, Utc};

/// Format a phone number for display
/// Normalizes North American numbers to (XXX) XXX-XXXX; anything else is
/// shown as given (randomuser.me returns numbers in each nationality's style).
pub fn format_phone(phone: &str) -> String {
    // Extract just the digits
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        10 if !digits.starts_with(&['0', '1'][..]) => {
            format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..10])
        }
        11 if digits.starts_with('1') => {
            format!("({}) {}-{}", &digits[1..4], &digits[4..7], &digits[7..11])
        }
        _ => phone.to_string(),
    }
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
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

/// Relative age of a timestamp for the status bar ("just now", "5m ago", "2h ago", "3d ago")
pub fn format_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - at).num_minutes();
    if minutes < 1 {
        // Includes clock skew (negative ages)
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}
