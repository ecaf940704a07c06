#![doc = include_str!("../README.md")]

#[cfg(feature = "http")]
pub mod api;
pub mod clock;
pub mod codec;
pub mod error;
pub mod login;
pub mod routes;
pub mod session;
pub mod types;

// Re-exports for convenient access
#[cfg(feature = "http")]
pub use api::{ApiClient, ApiConfig};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::Error;
pub use login::{LoginFlow, LoginStep};
pub use routes::Route;
pub use session::{
    AuthApi, AuthCheck, KeyValueStore, MemoryStore, Navigation, RouteGuard, SessionConfig,
    SessionManager, SessionStore, StorageKeys,
};
pub use types::{
    BasketId, ChartPeriod, Otp, PhoneNumber, RebalancingFrequency, StatusResponse,
    SubscriptionPlan, SubscriptionQuote, VerifyOtpResponse,
};
