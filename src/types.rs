use std::num::NonZeroU32;

use derive_more::{Display, Into};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Phone number accepted by the login form.
///
/// Digits plus the usual separators (space, `-`, `+`, `(`, `)`), at least
/// ten characters after trimming. Holding a `PhoneNumber` proves the format
/// is acceptable; it says nothing about whether the number is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    const MIN_LEN: usize = 10;

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidPhoneNumber(
                "Please enter your phone number".into(),
            ));
        }
        let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '-' | '+' | '(' | ')');
        if trimmed.len() < Self::MIN_LEN || !trimmed.chars().all(allowed) {
            return Err(Error::InvalidPhoneNumber(
                "Please enter a valid phone number".into(),
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl From<PhoneNumber> for String {
    fn from(p: PhoneNumber) -> Self {
        p.0
    }
}

/// Six-digit one-time password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display)]
#[serde(into = "String")]
pub struct Otp(String);

impl Otp {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Otp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidOtp("Please enter the OTP".into()));
        }
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidOtp("Please enter a valid 6-digit OTP".into()));
        }
        Ok(Self(s.to_owned()))
    }
}

impl From<Otp> for String {
    fn from(o: Otp) -> Self {
        o.0
    }
}

/// Basket identifier as it appears in API paths and in `/basket/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Into)]
#[serde(try_from = "String", into = "String")]
pub struct BasketId(String);

impl BasketId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for BasketId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for BasketId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.is_empty() || s.contains(['/', '?', '#']) || s.chars().any(char::is_whitespace) {
            Err(Error::InvalidBasketId(s))
        } else {
            Ok(Self(s))
        }
    }
}

/// Time window of a basket performance chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ChartPeriod {
    #[default]
    #[serde(rename = "1w")]
    #[display("1w")]
    OneWeek,
    #[serde(rename = "1m")]
    #[display("1m")]
    OneMonth,
    #[serde(rename = "6m")]
    #[display("6m")]
    SixMonths,
    #[serde(rename = "1y")]
    #[display("1y")]
    OneYear,
}

impl ChartPeriod {
    pub const ALL: [Self; 4] = [Self::OneWeek, Self::OneMonth, Self::SixMonths, Self::OneYear];
}

/// Subscription billing plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    #[default]
    #[display("monthly")]
    Monthly,
    #[display("yearly")]
    Yearly,
}

/// Price summary shown before subscribing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionQuote {
    pub plan: SubscriptionPlan,
    pub units: NonZeroU32,
    pub total_price: u64,
    pub total_savings: u64,
}

impl SubscriptionPlan {
    /// Price of one unit.
    #[must_use]
    pub fn unit_price(self) -> u64 {
        match self {
            Self::Monthly => 50,
            Self::Yearly => 500,
        }
    }

    /// Saving per unit compared to paying monthly for a year.
    #[must_use]
    pub fn unit_savings(self) -> u64 {
        match self {
            Self::Monthly => 0,
            Self::Yearly => 100,
        }
    }

    #[must_use]
    pub fn quote(self, units: NonZeroU32) -> SubscriptionQuote {
        let n = u64::from(units.get());
        SubscriptionQuote {
            plan: self,
            units,
            total_price: self.unit_price() * n,
            total_savings: self.unit_savings() * n,
        }
    }
}

/// How often a mandate rebalances the basket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum RebalancingFrequency {
    #[default]
    #[display("monthly")]
    Monthly,
    #[display("quarterly")]
    Quarterly,
    #[display("yearly")]
    Yearly,
}

/// Body of a successful `verify-otp` call.
///
/// ```json
/// { "data": [{ "accessToken": "..." }], "user": { ... } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub struct VerifyOtpResponse {
    #[serde(default)]
    pub data: Vec<TokenGrant>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub struct TokenGrant {
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
}

impl VerifyOtpResponse {
    /// Access token of the first grant, if it carries a non-empty one.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.data
            .first()
            .and_then(|grant| grant.access_token.as_deref())
            .filter(|token| !token.is_empty())
    }
}

/// Envelope returned by the subscribe and mandate endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub struct StatusResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl StatusResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}
