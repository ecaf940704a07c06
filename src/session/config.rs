use time::Duration;

use crate::error::Error;

/// Storage key names.
///
/// Defaults match the browser build, so both read the same entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Tab tier: token record (JSON).
    pub token: String,
    /// Tab tier: user profile (JSON).
    pub user: String,
    /// Tab tier: phone number of a login in progress (plain string).
    pub pending_phone: String,
    /// Durable tier: `"true"` or absent.
    pub authenticated_flag: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            token: "authToken".into(),
            user: "userData".into(),
            pending_phone: "phoneNumber".into(),
            authenticated_flag: "isAuthenticated".into(),
        }
    }
}

/// Session lifetimes and key layout.
///
/// Use [`from_env()`](SessionConfig::from_env) for convention-based setup,
/// or [`default()`](SessionConfig::default) with `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub(crate) token_lifetime: Duration,
    pub(crate) max_session_age: Duration,
    pub(crate) keys: StorageKeys,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_lifetime: Duration::hours(24),
            max_session_age: Duration::days(7),
            keys: StorageKeys::default(),
        }
    }
}

impl SessionConfig {
    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `LIQUIDE_TOKEN_LIFETIME_SECS`: token lifetime after login or refresh (default 24h)
    /// - `LIQUIDE_MAX_SESSION_AGE_SECS`: absolute session age ceiling (default 7 days)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but is not a positive integer.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();
        if let Some(secs) = positive_secs_from_env("LIQUIDE_TOKEN_LIFETIME_SECS")? {
            config = config.with_token_lifetime(Duration::seconds(secs));
        }
        if let Some(secs) = positive_secs_from_env("LIQUIDE_MAX_SESSION_AGE_SECS")? {
            config = config.with_max_session_age(Duration::seconds(secs));
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    #[must_use]
    pub fn with_max_session_age(mut self, max_age: Duration) -> Self {
        self.max_session_age = max_age;
        self
    }

    #[must_use]
    pub fn with_keys(mut self, keys: StorageKeys) -> Self {
        self.keys = keys;
        self
    }

    #[must_use]
    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime
    }

    #[must_use]
    pub fn max_session_age(&self) -> Duration {
        self.max_session_age
    }

    #[must_use]
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }
}

fn positive_secs_from_env(name: &str) -> Result<Option<i64>, Error> {
    match std::env::var(name) {
        Ok(value) => parse_positive_secs(name, &value).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_positive_secs(name: &str, value: &str) -> Result<i64, Error> {
    match value.trim().parse::<i64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(Error::Config(format!(
            "{name} must be a positive number of seconds, got {value:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.token_lifetime(), Duration::hours(24));
        assert_eq!(config.max_session_age(), Duration::days(7));
        assert_eq!(config.keys().token, "authToken");
        assert_eq!(config.keys().authenticated_flag, "isAuthenticated");
    }

    #[test]
    fn test_with_overrides() {
        let config = SessionConfig::default()
            .with_token_lifetime(Duration::minutes(30))
            .with_max_session_age(Duration::days(1));
        assert_eq!(config.token_lifetime(), Duration::minutes(30));
        assert_eq!(config.max_session_age(), Duration::days(1));
    }

    #[test]
    fn test_parse_positive_secs() {
        assert_eq!(parse_positive_secs("X", "3600").unwrap(), 3600);
        assert_eq!(parse_positive_secs("X", " 60 ").unwrap(), 60);
        assert!(matches!(
            parse_positive_secs("X", "0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            parse_positive_secs("X", "-5"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            parse_positive_secs("X", "a day"),
            Err(Error::Config(_))
        ));
    }
}
