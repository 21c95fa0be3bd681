//! Parsing of the human-friendly size, duration and path values stored in the config

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Parses a size such as `"50MB"`, `"32 kb"`, `"1G"` or `"512"` into bytes
pub fn parse_size(input: &str) -> Option<u64> {
    let normalized = input.trim().to_ascii_uppercase();
    let split = normalized
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(normalized.len());
    let (digits, unit) = normalized.split_at(split);
    if digits.is_empty() {
        return None;
    }

    let amount: u64 = digits.parse().ok()?;
    let multiplier: u64 = match unit.trim() {
        "" | "B" => 1,
        "K" | "KB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        _ => return None,
    };
    amount.checked_mul(multiplier)
}

/// Parses a duration made of `<number><unit>` groups, e.g. `"10s"`, `"500ms"`, `"1h30m"`
pub fn parse_duration(input: &str) -> Option<Duration> {
    let mut rest = input.trim();
    if rest.is_empty() {
        return None;
    }

    let mut total = Duration::ZERO;
    while !rest.is_empty() {
        let digits_end = rest.find(|c: char| !c.is_ascii_digit())?;
        if digits_end == 0 {
            return None;
        }
        let amount: u64 = rest[..digits_end].parse().ok()?;
        rest = &rest[digits_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let part = match &rest[..unit_end] {
            "ms" => Duration::from_millis(amount),
            "s" => Duration::from_secs(amount),
            "m" => Duration::from_secs(amount.checked_mul(60)?),
            "h" => Duration::from_secs(amount.checked_mul(3600)?),
            _ => return None,
        };
        total = total.checked_add(part)?;
        rest = &rest[unit_end..];
    }
    Some(total)
}

/// Expands `$home`, `$HOME`, `${home}`, `${HOME}` and a leading `~` against `home`
pub fn expand_home(path: &str, home: &Path) -> PathBuf {
    let home_str = home.to_string_lossy();
    let mut expanded = path
        .replace("${home}", &home_str)
        .replace("${HOME}", &home_str)
        .replace("$home", &home_str)
        .replace("$HOME", &home_str);

    if let Some(stripped) = expanded.strip_prefix('~') {
        expanded = format!("{}{}", home_str, stripped);
    }
    PathBuf::from(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("512"), Some(512));
        assert_eq!(parse_size("512B"), Some(512));
        assert_eq!(parse_size("32KB"), Some(32 * 1024));
        assert_eq!(parse_size("10mb"), Some(10 * 1024 * 1024));
        assert_eq!(parse_size("2 G"), Some(2 * 1024 * 1024 * 1024));
    }

    #[test]
    fn test_parse_size_rejects_garbage() {
        assert_eq!(parse_size(""), None);
        assert_eq!(parse_size("MB"), None);
        assert_eq!(parse_size("10 parsecs"), None);
        assert_eq!(parse_size("-5MB"), None);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("10s"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("2h"), Some(Duration::from_secs(7200)));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("10"), None);
        assert_eq!(parse_duration("s"), None);
        assert_eq!(parse_duration("10 seconds"), None);
        assert_eq!(parse_duration("1d"), None);
    }

    #[test]
    fn test_expand_home() {
        let home = Path::new("/home/alice");
        assert_eq!(
            expand_home("$home/.fontdock/logs/fontdock.log", home),
            PathBuf::from("/home/alice/.fontdock/logs/fontdock.log")
        );
        assert_eq!(
            expand_home("${HOME}/x.log", home),
            PathBuf::from("/home/alice/x.log")
        );
        assert_eq!(expand_home("~/x.log", home), PathBuf::from("/home/alice/x.log"));
        assert_eq!(expand_home("/var/log/x.log", home), PathBuf::from("/var/log/x.log"));
    }
}
