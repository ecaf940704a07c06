//! Phone/OTP login.
//!
//! ```text
//!  EnterPhone ──send_otp──▶ EnterOtp ──verify_otp──▶ Complete
//!      ▲                     │    ▲
//!      └──────reset──────────┘    └─resend_otp
//! ```
//!
//! Failed calls leave the flow where it was, so the form can show
//! [`Error::user_message`] and let the user try again.

use std::sync::Arc;

use crate::error::Error;
use crate::routes::Route;
use crate::session::{AuthApi, SessionManager};
use crate::types::{Otp, PhoneNumber};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStep {
    EnterPhone,
    EnterOtp { phone: PhoneNumber },
    Complete,
}

/// State of one login form.
pub struct LoginFlow<A> {
    manager: Arc<SessionManager<A>>,
    step: LoginStep,
}

impl<A: AuthApi> LoginFlow<A> {
    #[must_use]
    pub fn new(manager: Arc<SessionManager<A>>) -> Self {
        Self {
            manager,
            step: LoginStep::EnterPhone,
        }
    }

    #[must_use]
    pub fn step(&self) -> &LoginStep {
        &self.step
    }

    /// Validate the typed number and request an OTP for it.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPhoneNumber`] before any request is made, or the API
    /// error of the send call.
    pub async fn send_otp(&mut self, input: &str) -> Result<(), Error> {
        let phone: PhoneNumber = input.parse()?;
        self.manager.api().send_otp(&phone).await?;
        self.manager.start_login_flow(&phone);
        tracing::debug!("OTP sent");
        self.step = LoginStep::EnterOtp { phone };
        Ok(())
    }

    /// Send another OTP to the number already entered.
    ///
    /// # Errors
    ///
    /// [`Error::LoginFlow`] when no OTP was sent yet, or the API error.
    pub async fn resend_otp(&mut self) -> Result<(), Error> {
        let LoginStep::EnterOtp { phone } = &self.step else {
            return Err(Error::LoginFlow("no OTP has been sent yet".into()));
        };
        self.manager.api().send_otp(phone).await?;
        tracing::debug!("OTP resent");
        Ok(())
    }

    /// Verify the code and establish the session.
    ///
    /// Returns the route to navigate to, replacing the login page.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOtp`] before any request is made, the API error,
    /// [`Error::MissingAccessToken`] if the API accepted the code but sent
    /// no token, or [`Error::LoginFlow`] when no OTP was sent yet.
    pub async fn verify_otp(&mut self, code: &str) -> Result<Route, Error> {
        let LoginStep::EnterOtp { phone } = &self.step else {
            return Err(Error::LoginFlow("no OTP has been sent yet".into()));
        };
        let otp: Otp = code.parse()?;

        let response = self.manager.api().verify_otp(phone, &otp).await?;
        let token = response.access_token().ok_or(Error::MissingAccessToken)?;
        self.manager.complete_login(token, response.user.as_ref());

        self.step = LoginStep::Complete;
        Ok(Route::Dashboard)
    }

    /// Abandon the flow and forget the pending number.
    pub fn reset(&mut self) {
        self.manager.reset_login_flow();
        self.step = LoginStep::EnterPhone;
    }
}
