//! Client-side session state.
//!
//! Two key-value tiers back the session:
//!
//! - the **durable** tier outlives the tab and is shared by every tab of the
//!   origin; it only carries the `isAuthenticated` flag,
//! - the **tab** tier lives and dies with one tab; it carries the token
//!   record, the user profile and the phone number of a login in progress.
//!
//! A session counts as authenticated only when both tiers agree. Any
//! disagreement is repaired by [`SessionManager::is_authenticated`], which
//! clears the stale half and reports "not authenticated".
//!
//! # Wiring
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use liquide_client::session::{MemoryStore, RouteGuard, SessionManager, SessionStore};
//!
//! let durable = MemoryStore::new();
//! let tab = MemoryStore::new();
//! let store = SessionStore::new(durable, tab);
//!
//! let manager = Arc::new(SessionManager::new(store, api));
//! let guard = RouteGuard::new(manager.clone());
//! ```

mod config;
mod guard;
mod manager;
mod record;
mod storage;
mod store;
mod traits;

pub use config::{SessionConfig, StorageKeys};
pub use guard::{AuthCheck, Navigation, RouteGuard};
pub use manager::SessionManager;
pub use storage::{KeyValueStore, MemoryStore};
pub use store::SessionStore;
pub use traits::AuthApi;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::AuthApi;
    use crate::error::Error;
    use crate::types::{Otp, PhoneNumber, VerifyOtpResponse};

    /// In-memory [`AuthApi`] with canned answers.
    #[derive(Default)]
    pub(crate) struct FakeApi {
        reject_send: Option<String>,
        reject_verify: Option<String>,
        fail_logout: bool,
        verify_body: Option<serde_json::Value>,
        sent_to: Mutex<Vec<String>>,
        verify_calls: AtomicUsize,
        terminate_calls: AtomicUsize,
    }

    impl FakeApi {
        pub(crate) fn rejecting_send(mut self, message: &str) -> Self {
            self.reject_send = Some(message.into());
            self
        }

        pub(crate) fn rejecting_verify(mut self, message: &str) -> Self {
            self.reject_verify = Some(message.into());
            self
        }

        pub(crate) fn failing_logout(mut self) -> Self {
            self.fail_logout = true;
            self
        }

        pub(crate) fn with_verify_body(mut self, body: serde_json::Value) -> Self {
            self.verify_body = Some(body);
            self
        }

        pub(crate) fn sent_to(&self) -> Vec<String> {
            self.sent_to.lock().unwrap().clone()
        }

        pub(crate) fn verify_calls(&self) -> usize {
            self.verify_calls.load(Ordering::SeqCst)
        }

        pub(crate) fn terminate_calls(&self) -> usize {
            self.terminate_calls.load(Ordering::SeqCst)
        }
    }

    fn rejected(operation: &'static str, message: &str) -> Error {
        Error::Api {
            operation,
            status: Some(400),
            message: message.to_owned(),
        }
    }

    impl AuthApi for FakeApi {
        async fn send_otp(&self, phone: &PhoneNumber) -> Result<serde_json::Value, Error> {
            if let Some(message) = &self.reject_send {
                return Err(rejected("send OTP", message));
            }
            self.sent_to.lock().unwrap().push(phone.to_string());
            Ok(serde_json::json!({"status": "success"}))
        }

        async fn verify_otp(
            &self,
            _phone: &PhoneNumber,
            _otp: &Otp,
        ) -> Result<VerifyOtpResponse, Error> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.reject_verify {
                return Err(rejected("verify OTP", message));
            }
            let body = self.verify_body.clone().unwrap_or_else(|| {
                serde_json::json!({"data": [{"accessToken": "tok1"}], "user": {"id": 1}})
            });
            Ok(serde_json::from_value(body).unwrap())
        }

        async fn terminate_session(&self) -> Result<(), Error> {
            self.terminate_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_logout {
                return Err(rejected("logout", "Session already closed"));
            }
            Ok(())
        }
    }
}
