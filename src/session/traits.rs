use std::future::Future;

use crate::error::Error;
use crate::types::{Otp, PhoneNumber, VerifyOtpResponse};

/// Authentication calls the session core makes against the API.
///
/// [`ApiClient`](crate::ApiClient) is the production implementation. Each
/// call is a single request: no retry, no backoff.
///
/// # Example
///
/// ```rust,ignore
/// impl AuthApi for FakeApi {
///     async fn send_otp(&self, phone: &PhoneNumber) -> Result<serde_json::Value, Error> {
///         Ok(serde_json::json!({"status": "success"}))
///     }
///
///     async fn verify_otp(&self, phone: &PhoneNumber, otp: &Otp)
///         -> Result<VerifyOtpResponse, Error> {
///         Ok(serde_json::from_str(r#"{"data":[{"accessToken":"tok"}]}"#)?)
///     }
///
///     async fn terminate_session(&self) -> Result<(), Error> {
///         Ok(())
///     }
/// }
/// ```
pub trait AuthApi: Send + Sync + 'static {
    /// Ask the API to text a one-time password to `phone`.
    fn send_otp(
        &self,
        phone: &PhoneNumber,
    ) -> impl Future<Output = Result<serde_json::Value, Error>> + Send;

    /// Exchange the one-time password for an access token.
    ///
    /// A response without a token is still `Ok`; the caller decides that it
    /// is a failed login.
    fn verify_otp(
        &self,
        phone: &PhoneNumber,
        otp: &Otp,
    ) -> impl Future<Output = Result<VerifyOtpResponse, Error>> + Send;

    /// End the session server-side. Callers ignore the outcome.
    fn terminate_session(&self) -> impl Future<Output = Result<(), Error>> + Send;
}
