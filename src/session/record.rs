use serde::{Deserialize, Serialize};

/// Persisted token record, stored as JSON in the tab tier.
///
/// Field names follow the browser build so records written by either side
/// stay readable: `{"token": "...", "expires": ms, "createdAt": ms}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SessionRecord {
    /// Token after [`codec::encode`](crate::codec::encode). The raw token is never stored.
    #[serde(rename = "token")]
    pub(crate) encoded_token: String,
    /// Unix milliseconds after which the record is dead.
    #[serde(rename = "expires")]
    pub(crate) expires_at: i64,
    /// Unix milliseconds of login. Never moved by a refresh.
    #[serde(rename = "createdAt")]
    pub(crate) issued_at: i64,
}

/// Why a record failed its read-time check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expiry {
    Lifetime,
    MaxAge,
}

impl SessionRecord {
    pub(crate) fn new(encoded_token: String, now: i64, lifetime_ms: i64) -> Self {
        Self {
            encoded_token,
            expires_at: now.saturating_add(lifetime_ms),
            issued_at: now,
        }
    }

    /// Checks both the sliding expiry and the absolute age ceiling.
    pub(crate) fn check(&self, now: i64, max_age_ms: i64) -> Result<(), Expiry> {
        if now > self.expires_at {
            return Err(Expiry::Lifetime);
        }
        if now.saturating_sub(self.issued_at) > max_age_ms {
            return Err(Expiry::MaxAge);
        }
        Ok(())
    }

    pub(crate) fn extend(&mut self, now: i64, lifetime_ms: i64) {
        self.expires_at = now.saturating_add(lifetime_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 24 * 60 * 60 * 1000;

    #[test]
    fn test_json_layout() {
        let record = SessionRecord::new("YWJj".into(), 1_000, 500);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"token": "YWJj", "expires": 1_500, "createdAt": 1_000})
        );
    }

    #[test]
    fn test_reads_browser_record() {
        let raw = r#"{"token":"YWJjMTIz","expires":1700086400000,"createdAt":1700000000000}"#;
        let record: SessionRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.issued_at, 1_700_000_000_000);
        assert_eq!(record.expires_at, 1_700_086_400_000);
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let record = SessionRecord::new("t".into(), 0, 1_000);
        assert_eq!(record.check(1_000, 7 * DAY), Ok(()));
        assert_eq!(record.check(1_001, 7 * DAY), Err(Expiry::Lifetime));
    }

    #[test]
    fn test_extend_keeps_issued_at() {
        let mut record = SessionRecord::new("t".into(), 0, DAY);
        record.extend(6 * DAY, DAY);
        assert_eq!(record.issued_at, 0);
        assert_eq!(record.expires_at, 7 * DAY);
        assert_eq!(record.check(7 * DAY, 7 * DAY), Ok(()));
        assert_eq!(record.check(7 * DAY + 1, 7 * DAY), Err(Expiry::Lifetime));

        record.extend(7 * DAY - 1, DAY);
        assert_eq!(record.check(7 * DAY + 1, 7 * DAY), Err(Expiry::MaxAge));
    }
}
