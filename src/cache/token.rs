use chrono::{DateTime, Duration, Utc};

/// An opaque database credential plus its optional absolute expiry.
///
/// Immutable once created; a refresh produces a new `Token` rather than
/// mutating the old one.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    pub fn new(value: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { value, expires_at }
    }

    /// A token without `expires_at` never expires. Otherwise it counts as
    /// expired `skew_seconds` before the real expiry, so a value handed to a
    /// connection attempt keeps at least that much usable lifetime.
    pub fn is_expired(&self, skew_seconds: u64) -> bool {
        match self.expires_at {
            None => false,
            Some(expires_at) => {
                let threshold = i64::try_from(skew_seconds)
                    .ok()
                    .and_then(Duration::try_seconds)
                    .and_then(|skew| expires_at.checked_sub_signed(skew));
                match threshold {
                    Some(threshold) => Utc::now() >= threshold,
                    // a skew window this wide covers every representable instant
                    None => true,
                }
            }
        }
    }
}

// The value is a live credential; keep it out of logs and error output.
impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
