use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

/// Parse an expiry timestamp leniently.
///
/// Accepts RFC 3339 with an offset or `Z` (normalized to UTC), naive
/// timestamps without a zone (assumed UTC, `T` or space separator, optional
/// fractional seconds) and bare dates (midnight UTC). An unparseable value
/// logs a warning and yields `None`: the token is then treated as
/// non-expiring rather than rejected.
pub fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Some(naive.and_utc());
        }
    }

    warn!(
        "could not parse token expiry '{}', treating the token as non-expiring",
        raw
    );
    None
}

/// Expiry for a token valid `ttl_seconds` from now.
///
/// A TTL too large for timestamp arithmetic logs a warning and yields
/// `None`, the same leniency as an unparseable timestamp.
pub fn expiry_from_ttl(ttl_seconds: u64) -> Option<DateTime<Utc>> {
    let expires_at = i64::try_from(ttl_seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl));
    if expires_at.is_none() {
        warn!(
            "token ttl of {}s is out of range, treating the token as non-expiring",
            ttl_seconds
        );
    }
    expires_at
}
