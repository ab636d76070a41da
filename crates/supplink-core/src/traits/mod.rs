//! Core traits for session storage and host integration.

mod redirect;
mod token_store;

pub use redirect::{LogRedirect, LoginRedirect};
pub use token_store::TokenStore;
