use std::num::NonZeroU32;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::error::Error;
use crate::session::{AuthApi, SessionStore};
use crate::types::{
    BasketId, ChartPeriod, Otp, PhoneNumber, RebalancingFrequency, StatusResponse,
    SubscriptionPlan, VerifyOtpResponse,
};

/// Liquide API configuration.
///
/// ```rust,ignore
/// use liquide_client::ApiConfig;
///
/// let config = ApiConfig::new("https://api.liquide.example".parse()?)
///     .with_protected_timeout(std::time::Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ApiConfig {
    pub(crate) base_url: Url,
    pub(crate) protected_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL.parse().expect("valid default URL"))
    }
}

impl ApiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://10.10.13.33:1337";

    /// Create a configuration for the API at `base_url`.
    ///
    /// Protected requests time out after one second unless overridden.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            protected_timeout: Duration::from_millis(1_000),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `LIQUIDE_API_URL`: API base URL
    /// - `LIQUIDE_API_TIMEOUT_MS`: timeout of protected requests in milliseconds
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but invalid.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();
        if let Ok(url_str) = std::env::var("LIQUIDE_API_URL") {
            let url: Url = url_str
                .parse()
                .map_err(|e| Error::Config(format!("LIQUIDE_API_URL: {e}")))?;
            config = Self::new(url);
        }
        if let Ok(ms) = std::env::var("LIQUIDE_API_TIMEOUT_MS") {
            let ms: u64 = ms
                .trim()
                .parse()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| {
                    Error::Config(format!(
                        "LIQUIDE_API_TIMEOUT_MS must be a positive integer, got {ms:?}"
                    ))
                })?;
            config = config.with_protected_timeout(Duration::from_millis(ms));
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_protected_timeout(mut self, timeout: Duration) -> Self {
        self.protected_timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn protected_timeout(&self) -> Duration {
        self.protected_timeout
    }

    /// `base_url` with `path` appended, keeping any path prefix of the base.
    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}{path}")
            .parse()
            .map_err(|e| Error::Config(format!("invalid endpoint {path}: {e}")))
    }
}

/// HTTP client for the Liquide API.
///
/// Public calls (OTP send/verify) go out without credentials or timeout.
/// Protected calls carry `Authorization: Bearer <token>` read from the
/// [`SessionStore`] at request time and fail after the configured timeout.
pub struct ApiClient {
    config: ApiConfig,
    public: reqwest::Client,
    protected: reqwest::Client,
    session: SessionStore,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP clients cannot be built.
    pub fn new(config: ApiConfig, session: SessionStore) -> Result<Self, Error> {
        let public = reqwest::Client::builder().build()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let protected = reqwest::Client::builder()
            .timeout(config.protected_timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            config,
            public,
            protected,
            session,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Investments held by the user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure or timeout, or
    /// [`Error::Api`] if the API rejects the request.
    pub async fn investments(&self) -> Result<serde_json::Value, Error> {
        let url = self.config.endpoint("/investments")?;
        let response = self.protected_request(Method::GET, url).send().await?;
        read_json(response, "fetch investments", "Failed to fetch investments").await
    }

    /// All baskets on offer.
    ///
    /// # Errors
    ///
    /// See [`investments`](Self::investments).
    pub async fn baskets(&self) -> Result<serde_json::Value, Error> {
        let url = self.config.endpoint("/baskets")?;
        let response = self.protected_request(Method::GET, url).send().await?;
        read_json(response, "fetch baskets", "Failed to fetch baskets").await
    }

    /// One basket from the basket list.
    ///
    /// # Errors
    ///
    /// See [`investments`](Self::investments).
    pub async fn basket(&self, id: &BasketId) -> Result<serde_json::Value, Error> {
        let url = self.config.endpoint(&format!("/baskets/{id}"))?;
        let response = self.protected_request(Method::GET, url).send().await?;
        read_json(response, "fetch basket", "Failed to fetch basket").await
    }

    /// Detail view of a basket (composition, returns, description).
    ///
    /// # Errors
    ///
    /// See [`investments`](Self::investments).
    pub async fn basket_details(&self, id: &BasketId) -> Result<serde_json::Value, Error> {
        let url = self.config.endpoint(&format!("/basket/{id}"))?;
        let response = self.protected_request(Method::GET, url).send().await?;
        read_json(response, "fetch basket details", "Failed to fetch basket details").await
    }

    /// Performance series of a basket over `period`.
    ///
    /// # Errors
    ///
    /// See [`investments`](Self::investments).
    pub async fn basket_chart(
        &self,
        id: &BasketId,
        period: ChartPeriod,
    ) -> Result<serde_json::Value, Error> {
        let response = self.basket_chart_request(id, period)?.send().await?;
        read_json(
            response,
            "fetch basket chart",
            "Failed to fetch basket chart data",
        )
        .await
    }

    /// Subscribe to `units` units of a basket on `plan`.
    ///
    /// # Errors
    ///
    /// See [`investments`](Self::investments).
    pub async fn subscribe(
        &self,
        id: &BasketId,
        plan: SubscriptionPlan,
        units: NonZeroU32,
    ) -> Result<StatusResponse, Error> {
        let response = self.subscribe_request(id, plan, units)?.send().await?;
        read_json(response, "subscribe", "Failed to subscribe").await
    }

    /// Configure the payment mandate of a basket subscription.
    ///
    /// # Errors
    ///
    /// See [`investments`](Self::investments).
    pub async fn submit_mandate(
        &self,
        id: &BasketId,
        rebalancing_frequency: RebalancingFrequency,
    ) -> Result<StatusResponse, Error> {
        let response = self
            .mandate_request(id, rebalancing_frequency)?
            .send()
            .await?;
        read_json(response, "submit mandate", "Failed to submit mandate").await
    }

    fn basket_chart_request(
        &self,
        id: &BasketId,
        period: ChartPeriod,
    ) -> Result<RequestBuilder, Error> {
        let mut url = self.config.endpoint(&format!("/basket/{id}/chart"))?;
        url.query_pairs_mut()
            .append_pair("period", &period.to_string());
        Ok(self.protected_request(Method::GET, url))
    }

    fn subscribe_request(
        &self,
        id: &BasketId,
        plan: SubscriptionPlan,
        units: NonZeroU32,
    ) -> Result<RequestBuilder, Error> {
        let url = self.config.endpoint(&format!("/baskets/{id}/subscribe"))?;
        Ok(self
            .protected_request(Method::POST, url)
            .json(&json!({ "period": plan, "units": units.get() })))
    }

    fn mandate_request(
        &self,
        id: &BasketId,
        rebalancing_frequency: RebalancingFrequency,
    ) -> Result<RequestBuilder, Error> {
        let url = self.config.endpoint(&format!("/baskets/{id}/mandate"))?;
        Ok(self
            .protected_request(Method::POST, url)
            .json(&json!({ "rebalancingFrequency": rebalancing_frequency })))
    }

    fn send_otp_request(&self, phone: &PhoneNumber) -> Result<RequestBuilder, Error> {
        let url = self.config.endpoint("/send-otp")?;
        Ok(self
            .public
            .post(url)
            .json(&json!({ "mobile": phone.as_str() })))
    }

    fn verify_otp_request(&self, phone: &PhoneNumber, otp: &Otp) -> Result<RequestBuilder, Error> {
        let url = self.config.endpoint("/verify-otp")?;
        Ok(self
            .public
            .post(url)
            .json(&json!({ "mobile": phone.as_str(), "otp": otp.as_str() })))
    }

    fn protected_request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.protected.request(method, url);
        match self.session.get_token() {
            Some(token) => request.bearer_auth(token),
            None => {
                tracing::debug!("No session token, sending protected request without credentials");
                request
            }
        }
    }
}

impl AuthApi for ApiClient {
    async fn send_otp(&self, phone: &PhoneNumber) -> Result<serde_json::Value, Error> {
        let response = self.send_otp_request(phone)?.send().await?;
        read_json(response, "send OTP", "Failed to send OTP").await
    }

    async fn verify_otp(&self, phone: &PhoneNumber, otp: &Otp) -> Result<VerifyOtpResponse, Error> {
        let response = self.verify_otp_request(phone, otp)?.send().await?;
        read_json(response, "verify OTP", "Failed to verify OTP").await
    }

    async fn terminate_session(&self) -> Result<(), Error> {
        let url = self.config.endpoint("/logout")?;
        let response = self.protected_request(Method::POST, url).send().await?;
        ensure_success(response, "logout", "Failed to log out").await?;
        Ok(())
    }
}

/// Checks HTTP response status; returns the response on success or an error
/// carrying the server's message.
async fn ensure_success(
    response: reqwest::Response,
    operation: &'static str,
    fallback: &str,
) -> Result<reqwest::Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(operation, status, "API request failed");
    Err(Error::Api {
        operation,
        status: Some(status),
        message: error_message(&body, fallback),
    })
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    operation: &'static str,
    fallback: &str,
) -> Result<T, Error> {
    let response = ensure_success(response, operation, fallback).await?;
    response.json::<T>().await.map_err(Into::into)
}

/// The `message` field of an error body, or `fallback`.
fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(str::to_owned))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_owned())
}
