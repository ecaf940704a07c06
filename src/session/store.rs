use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use time::Duration;

use super::config::SessionConfig;
use super::record::SessionRecord;
use super::storage::KeyValueStore;
use crate::clock::{Clock, SystemClock};
use crate::codec;

const FLAG_SET: &str = "true";

/// Session persistence over a durable tier and a tab tier.
///
/// Cheap to clone; clones share the same tiers and clock. Storage failures
/// never escape: reads degrade to "absent" and writes are logged.
#[derive(Clone)]
pub struct SessionStore {
    durable: Arc<dyn KeyValueStore>,
    tab: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a store with the wall clock and default config.
    #[must_use]
    pub fn new(durable: impl KeyValueStore, tab: impl KeyValueStore) -> Self {
        Self {
            durable: Arc::new(durable),
            tab: Arc::new(tab),
            clock: Arc::new(SystemClock),
            config: SessionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ── Token ──────────────────────────────────────────────────────

    /// Store a freshly issued token and raise the durable flag.
    ///
    /// The two writes are independent. If the second one is lost the tiers
    /// disagree, which [`SessionManager::is_authenticated`](super::SessionManager::is_authenticated)
    /// repairs.
    pub fn put_token(&self, raw_token: &str, lifetime: Duration) {
        let now = self.clock.now_millis();
        let record = SessionRecord::new(
            codec::encode(raw_token),
            now,
            saturating_millis(lifetime),
        );
        if self.write_record(&record) {
            tracing::debug!(expires_at = record.expires_at, "Session token stored");
        }
        self.write(Tier::Durable, &self.config.keys.authenticated_flag, FLAG_SET);
    }

    /// Current raw token, if a live record exists.
    ///
    /// A record past its expiry or past the session age ceiling is deleted
    /// before returning `None`.
    #[must_use]
    pub fn get_token(&self) -> Option<String> {
        self.live_record().map(|record| codec::decode(&record.encoded_token))
    }

    /// Push the expiry of a live record to `now + token_lifetime`.
    ///
    /// The login time is kept, so the session age ceiling still applies.
    /// Returns `false` without touching storage when there is no live record.
    pub fn refresh(&self) -> bool {
        let Some(mut record) = self.live_record() else {
            return false;
        };
        record.extend(
            self.clock.now_millis(),
            saturating_millis(self.config.token_lifetime),
        );
        let extended = self.write_record(&record);
        if extended {
            tracing::debug!(expires_at = record.expires_at, "Session token refreshed");
        }
        extended
    }

    /// Whether a token record is physically present, with no expiry check.
    #[must_use]
    pub fn has_token_record(&self) -> bool {
        self.read(Tier::Tab, &self.config.keys.token).is_some()
    }

    // ── Durable flag ───────────────────────────────────────────────

    /// Whether the durable tier claims an authenticated session.
    #[must_use]
    pub fn authenticated_flag(&self) -> bool {
        self.read(Tier::Durable, &self.config.keys.authenticated_flag)
            .is_some_and(|v| v == FLAG_SET)
    }

    pub(crate) fn clear_authenticated_flag(&self) {
        self.delete(Tier::Durable, &self.config.keys.authenticated_flag);
    }

    pub(crate) fn clear_token_record(&self) {
        self.delete(Tier::Tab, &self.config.keys.token);
    }

    // ── User profile ───────────────────────────────────────────────

    pub fn put_user<T: Serialize + ?Sized>(&self, profile: &T) {
        match serde_json::to_string(profile) {
            Ok(json) => {
                self.write(Tier::Tab, &self.config.keys.user, &json);
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize user profile"),
        }
    }

    /// Stored user profile. A value that does not deserialize is `None`.
    #[must_use]
    pub fn get_user<T: DeserializeOwned>(&self) -> Option<T> {
        let json = self.read(Tier::Tab, &self.config.keys.user)?;
        serde_json::from_str(&json)
            .inspect_err(|e| tracing::warn!(error = %e, "Stored user profile is unreadable"))
            .ok()
    }

    // ── Pending phone ──────────────────────────────────────────────

    pub fn put_pending_phone(&self, phone_number: &str) {
        self.write(Tier::Tab, &self.config.keys.pending_phone, phone_number);
    }

    #[must_use]
    pub fn get_pending_phone(&self) -> Option<String> {
        self.read(Tier::Tab, &self.config.keys.pending_phone)
    }

    pub fn clear_pending_phone(&self) {
        self.delete(Tier::Tab, &self.config.keys.pending_phone);
    }

    // ── Wholesale ──────────────────────────────────────────────────

    /// Remove token record, user profile, pending phone and the durable flag.
    pub fn clear_all(&self) {
        let keys = &self.config.keys;
        self.delete(Tier::Tab, &keys.token);
        self.delete(Tier::Tab, &keys.user);
        self.delete(Tier::Tab, &keys.pending_phone);
        self.delete(Tier::Durable, &keys.authenticated_flag);
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn live_record(&self) -> Option<SessionRecord> {
        let json = self.read(Tier::Tab, &self.config.keys.token)?;
        let record: SessionRecord = match serde_json::from_str(&json) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Stored token record is corrupt, removing");
                self.clear_token_record();
                return None;
            }
        };

        let now = self.clock.now_millis();
        let max_age = saturating_millis(self.config.max_session_age);
        if let Err(reason) = record.check(now, max_age) {
            tracing::warn!(?reason, "Stored token expired, removing");
            self.clear_token_record();
            return None;
        }
        Some(record)
    }

    fn write_record(&self, record: &SessionRecord) -> bool {
        match serde_json::to_string(record) {
            Ok(json) => self.write(Tier::Tab, &self.config.keys.token, &json),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize token record");
                false
            }
        }
    }

    fn tier(&self, tier: Tier) -> &dyn KeyValueStore {
        match tier {
            Tier::Durable => self.durable.as_ref(),
            Tier::Tab => self.tab.as_ref(),
        }
    }

    fn read(&self, tier: Tier, key: &str) -> Option<String> {
        self.tier(tier)
            .get(key)
            .inspect_err(|e| tracing::error!(?tier, key, error = %e, "Storage read failed"))
            .ok()
            .flatten()
    }

    fn write(&self, tier: Tier, key: &str, value: &str) -> bool {
        self.tier(tier)
            .set(key, value)
            .inspect_err(|e| tracing::error!(?tier, key, error = %e, "Storage write failed"))
            .is_ok()
    }

    fn delete(&self, tier: Tier, key: &str) {
        if let Err(e) = self.tier(tier).remove(key) {
            tracing::error!(?tier, key, error = %e, "Storage remove failed");
        }
    }
}

/// Whole milliseconds of `d`, clamped to the `i64` range.
fn saturating_millis(d: Duration) -> i64 {
    i64::try_from(d.whole_milliseconds())
        .unwrap_or(if d.is_negative() { i64::MIN } else { i64::MAX })
}

#[derive(Debug, Clone, Copy)]
enum Tier {
    Durable,
    Tab,
}
