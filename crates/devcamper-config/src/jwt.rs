use std::env;

const DEFAULT_SECRET: &str = "devcamper-secret-change-in-production";
const DEFAULT_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;
const DEFAULT_COOKIE_EXPIRE_DAYS: i64 = 30;
/// Upper bound for both lifetimes: ten years.
const MAX_EXPIRE_DAYS: i64 = 3_650;
const MAX_EXPIRY_SECONDS: i64 = MAX_EXPIRE_DAYS * 86_400;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds.
    pub expiry: i64,
    /// Lifetime of the `token` cookie, in days.
    pub cookie_expire_days: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.to_string()),
            expiry: env::var("JWT_EXPIRE")
                .ok()
                .and_then(|s| parse_duration(&s))
                .unwrap_or(DEFAULT_EXPIRY_SECONDS),
            cookie_expire_days: env::var("JWT_COOKIE_EXPIRE")
                .ok()
                .and_then(|s| parse_cookie_days(&s))
                .unwrap_or(DEFAULT_COOKIE_EXPIRE_DAYS),
        }
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiry: DEFAULT_EXPIRY_SECONDS,
            cookie_expire_days: DEFAULT_COOKIE_EXPIRE_DAYS,
        }
    }
}

/// Parses `30d`, `12h`, `90m`, `45s` or a bare number of seconds. Anything
/// longer than ten years is rejected.
pub fn parse_duration(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (digits, multiplier) = match value.chars().last()? {
        'd' => (&value[..value.len() - 1], 86_400),
        'h' => (&value[..value.len() - 1], 3_600),
        'm' => (&value[..value.len() - 1], 60),
        's' => (&value[..value.len() - 1], 1),
        c if c.is_ascii_digit() => (value, 1),
        _ => return None,
    };

    digits
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n > 0)
        .and_then(|n| n.checked_mul(multiplier))
        .filter(|secs| *secs <= MAX_EXPIRY_SECONDS)
}

/// Whole days between 1 and ten years.
fn parse_cookie_days(value: &str) -> Option<i64> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|days| (1..=MAX_EXPIRE_DAYS).contains(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("30d"), Some(30 * 86_400));
        assert_eq!(parse_duration("12h"), Some(12 * 3_600));
        assert_eq!(parse_duration("90m"), Some(90 * 60));
        assert_eq!(parse_duration("45s"), Some(45));
        assert_eq!(parse_duration("3600"), Some(3600));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("d"), None);
        assert_eq!(parse_duration("10w"), None);
        assert_eq!(parse_duration("-5m"), None);
        assert_eq!(parse_duration("0"), None);
    }

    #[test]
    fn test_parse_duration_rejects_overflow_and_excessive_lifetimes() {
        assert_eq!(parse_duration("9223372036854775807d"), None);
        assert_eq!(parse_duration("9223372036854775807"), None);
        assert_eq!(parse_duration("3651d"), None);
        assert_eq!(parse_duration("3650d"), Some(MAX_EXPIRY_SECONDS));
    }

    #[test]
    fn test_parse_cookie_days_bounds() {
        assert_eq!(parse_cookie_days("30"), Some(30));
        assert_eq!(parse_cookie_days(" 3650 "), Some(3_650));
        assert_eq!(parse_cookie_days("3651"), None);
        assert_eq!(parse_cookie_days("9223372036854775807"), None);
        assert_eq!(parse_cookie_days("0"), None);
        assert_eq!(parse_cookie_days("-1"), None);
        assert_eq!(parse_cookie_days("thirty"), None);
    }

    #[test]
    fn test_with_secret_defaults() {
        let config = JwtConfig::with_secret("abc");
        assert_eq!(config.secret, "abc");
        assert_eq!(config.expiry, 30 * 86_400);
        assert_eq!(config.cookie_expire_days, 30);
    }
}
