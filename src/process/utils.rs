/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// A cell counts as unanswered when it is blank or one of the NA markers.
pub fn is_missing(cell: &str, na_values: &[String]) -> bool {
    let v = cell.trim();
    v.is_empty() || na_values.iter().any(|na| na == v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_str_strips_quotes_and_space() {
        assert_eq!(clean_str("  \"C#\" "), "C#");
        assert_eq!(clean_str(" Go"), "Go");
        assert_eq!(clean_str("\""), "\"");
    }

    #[test]
    fn na_markers_are_missing() {
        let na = vec!["NA".to_string()];
        assert!(is_missing("NA", &na));
        assert!(is_missing("  ", &na));
        assert!(!is_missing("Rust", &na));
    }
}
