#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The API answered with a non-success status.
    ///
    /// `message` is the server-provided message when there is one, otherwise
    /// a fallback naming the failed operation.
    #[error("{message}")]
    Api {
        operation: &'static str,
        status: Option<u16>,
        message: String,
    },
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Login response did not contain an access token")]
    MissingAccessToken,
    #[error("{0}")]
    InvalidPhoneNumber(String),
    #[error("{0}")]
    InvalidOtp(String),
    #[error("Invalid basket id: {0:?}")]
    InvalidBasketId(String),
    #[error("Login flow error: {0}")]
    LoginFlow(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Storage(_) | Self::Config(_) => "Something went wrong.....".to_owned(),
            other => other.to_string(),
        }
    }
}
