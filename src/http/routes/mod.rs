pub mod accounts;
pub mod catalog;
pub mod codes;
pub mod institutes;
pub mod uploads;

/// Parse a numeric query parameter defensively: missing, unparsable, or
/// zero/negative values fall back to `default`.
pub(crate) fn parse_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value >= 1)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_on_garbage() {
        assert_eq!(parse_or(Some("3"), 1), 3);
        assert_eq!(parse_or(Some("0"), 1), 1);
        assert_eq!(parse_or(Some("-2"), 1), 1);
        assert_eq!(parse_or(Some("abc"), 1), 1);
        assert_eq!(parse_or(None, 10), 10);
    }
}
