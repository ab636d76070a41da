//! Validated value types.
//!
//! These types enforce their invariants at construction time.

mod api_url;
mod profile;

pub use api_url::ApiUrl;
pub use profile::{Role, UserProfile};
