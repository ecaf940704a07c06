use super::store::SessionStore;
use super::traits::AuthApi;
use crate::types::PhoneNumber;

/// Session lifecycle: login, logout, authentication checks.
///
/// Construct once per tab and share it (typically behind an `Arc`) with the
/// [`RouteGuard`](super::RouteGuard) and the views.
pub struct SessionManager<A> {
    store: SessionStore,
    api: A,
}

impl<A> SessionManager<A> {
    #[must_use]
    pub fn new(store: SessionStore, api: A) -> Self {
        Self { store, api }
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Persist the outcome of a successful OTP verification.
    ///
    /// The pending phone number is left in place.
    pub fn complete_login(&self, raw_token: &str, profile: Option<&serde_json::Value>) {
        self.store
            .put_token(raw_token, self.store.config().token_lifetime());
        if let Some(profile) = profile {
            self.store.put_user(profile);
        }
        tracing::info!(with_profile = profile.is_some(), "Login completed");
    }

    /// Whether this tab holds a live session.
    ///
    /// Requires both a live token record in the tab tier and the flag in the
    /// durable tier. When only one of them is present, that one is removed
    /// and the answer is `false`. This is how a second tab, which sees the
    /// shared flag but not the first tab's token, ends up logged out instead
    /// of being let in without a token.
    pub fn is_authenticated(&self) -> bool {
        let has_token = self.store.get_token().is_some();
        let flag = self.store.authenticated_flag();

        match (has_token, flag) {
            (true, true) => true,
            (false, false) => false,
            (false, true) => {
                tracing::warn!("Authenticated flag set without a live token, clearing flag");
                self.store.clear_authenticated_flag();
                false
            }
            (true, false) => {
                tracing::warn!("Token present without authenticated flag, clearing token");
                self.store.clear_token_record();
                false
            }
        }
    }

    #[must_use]
    pub fn current_user(&self) -> Option<serde_json::Value> {
        self.store.get_user()
    }

    /// Remember the number an OTP was sent to. Calling again overwrites it.
    pub fn start_login_flow(&self, phone: &PhoneNumber) {
        self.store.put_pending_phone(phone.as_str());
    }

    #[must_use]
    pub fn pending_phone(&self) -> Option<String> {
        self.store.get_pending_phone()
    }

    /// Abandon a login in progress.
    pub fn reset_login_flow(&self) {
        self.store.clear_pending_phone();
    }

    /// Extend the current token's expiry. See [`SessionStore::refresh`].
    pub fn refresh(&self) -> bool {
        self.store.refresh()
    }
}

impl<A: AuthApi> SessionManager<A> {
    /// Log out.
    ///
    /// The server-side termination call is best effort; whatever it does,
    /// local state is cleared afterwards.
    pub async fn logout(&self) {
        if let Err(e) = self.api.terminate_session().await {
            tracing::warn!(error = %e, "Session termination failed during logout");
        }
        self.store.clear_all();
        tracing::info!("Logged out");
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::{Duration, OffsetDateTime};

    use super::*;
    use crate::clock::ManualClock;
    use crate::session::testing::FakeApi;
    use crate::session::{KeyValueStore, MemoryStore};

    fn manager_with(durable: MemoryStore, tab: MemoryStore) -> SessionManager<FakeApi> {
        SessionManager::new(SessionStore::new(durable, tab), FakeApi::default())
    }

    fn manager() -> SessionManager<FakeApi> {
        manager_with(MemoryStore::new(), MemoryStore::new())
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let manager = manager();
        manager.complete_login("tok1", Some(&json!({"id": 1})));

        assert!(manager.is_authenticated());
        assert_eq!(manager.current_user(), Some(json!({"id": 1})));

        manager.logout().await;

        assert!(!manager.is_authenticated());
        assert_eq!(manager.current_user(), None);
        assert_eq!(manager.api().terminate_calls(), 1);
    }

    #[tokio::test]
    async fn test_logout_clears_state_when_endpoint_fails() {
        let durable = MemoryStore::new();
        let tab = MemoryStore::new();
        let manager = SessionManager::new(
            SessionStore::new(durable.clone(), tab.clone()),
            FakeApi::default().failing_logout(),
        );
        manager.start_login_flow(&"9876543210".parse().unwrap());
        manager.complete_login("tok1", Some(&json!({"id": 1})));

        manager.logout().await;

        assert!(durable.is_empty());
        assert!(tab.is_empty());
        assert_eq!(manager.pending_phone(), None);
    }

    #[test]
    fn test_login_without_profile() {
        let manager = manager();
        manager.complete_login("tok1", None);
        assert!(manager.is_authenticated());
        assert_eq!(manager.current_user(), None);
    }

    #[test]
    fn test_not_authenticated_after_clear_all() {
        let manager = manager();
        manager.complete_login("tok1", None);
        manager.store().clear_all();
        assert!(!manager.is_authenticated());
    }

    #[test]
    fn test_flag_without_token_is_cleared() {
        let durable = MemoryStore::new();
        durable.set("isAuthenticated", "true").unwrap();
        let manager = manager_with(durable.clone(), MemoryStore::new());

        assert!(!manager.is_authenticated());
        assert_eq!(durable.get("isAuthenticated").unwrap(), None);
        assert!(!manager.store().authenticated_flag());
    }

    #[test]
    fn test_token_without_flag_is_cleared() {
        let durable = MemoryStore::new();
        let manager = manager_with(durable.clone(), MemoryStore::new());
        manager.complete_login("tok1", None);
        durable.clear();

        assert!(!manager.is_authenticated());
        assert!(!manager.store().has_token_record());
    }

    #[test]
    fn test_second_tab_does_not_inherit_session() {
        let durable = MemoryStore::new();
        let tab_a = manager_with(durable.clone(), MemoryStore::new());
        let tab_b = manager_with(durable.clone(), MemoryStore::new());

        tab_a.complete_login("tok1", Some(&json!({"id": 1})));
        assert!(tab_b.store().authenticated_flag());

        assert!(!tab_b.is_authenticated());
        assert!(!tab_b.store().authenticated_flag());
        assert_eq!(durable.get("isAuthenticated").unwrap(), None);
    }

    #[test]
    fn test_expired_token_heals_flag() {
        let clock = ManualClock::new(OffsetDateTime::UNIX_EPOCH + Duration::days(20_000));
        let durable = MemoryStore::new();
        let store = SessionStore::new(durable.clone(), MemoryStore::new()).with_clock(clock.clone());
        let manager = SessionManager::new(store, FakeApi::default());

        manager.complete_login("tok1", None);
        assert!(manager.is_authenticated());

        clock.advance(Duration::hours(24) + Duration::milliseconds(1));
        assert!(!manager.is_authenticated());
        assert!(durable.is_empty());
    }

    #[test]
    fn test_refresh_keeps_session_alive() {
        let clock = ManualClock::new(OffsetDateTime::UNIX_EPOCH + Duration::days(20_000));
        let store = SessionStore::new(MemoryStore::new(), MemoryStore::new()).with_clock(clock.clone());
        let manager = SessionManager::new(store, FakeApi::default());

        assert!(!manager.refresh());
        manager.complete_login("tok1", None);
        clock.advance(Duration::hours(23));
        assert!(manager.refresh());
        clock.advance(Duration::hours(23));
        assert!(manager.is_authenticated());
    }

    #[test]
    fn test_pending_phone_is_not_authentication() {
        let manager = manager();
        manager.start_login_flow(&"9876543210".parse().unwrap());
        assert!(!manager.is_authenticated());
        assert_eq!(manager.pending_phone().as_deref(), Some("9876543210"));
    }

    #[test]
    fn test_start_login_flow_overwrites() {
        let manager = manager();
        manager.start_login_flow(&"9876543210".parse().unwrap());
        manager.start_login_flow(&"9123456780".parse().unwrap());
        assert_eq!(manager.pending_phone().as_deref(), Some("9123456780"));
        manager.reset_login_flow();
        assert_eq!(manager.pending_phone(), None);
    }

    #[test]
    fn test_complete_login_keeps_pending_phone() {
        let manager = manager();
        manager.start_login_flow(&"9876543210".parse().unwrap());
        manager.complete_login("tok1", None);
        assert_eq!(manager.pending_phone().as_deref(), Some("9876543210"));
    }
}
