//! supplink-core - Session types and traits for the supplink marketplace client.
//!
//! This crate holds everything about a signed-in session that does not need
//! a network: the data model, the error taxonomy, credential expiry checks,
//! and the storage and redirect seams that transports and hosts plug into.

pub mod clock;
pub mod error;
pub mod memory;
pub mod session;
pub mod tokens;
pub mod traits;
pub mod types;

pub use clock::{Clock, FixedClock, SessionClock, SystemClock};
pub use error::{Error, ErrorReport};
pub use memory::MemoryTokenStore;
pub use session::Session;
pub use tokens::{AccessToken, RefreshToken};
pub use traits::{LogRedirect, LoginRedirect, TokenStore};
pub use types::{ApiUrl, Role, UserProfile};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
