//! Authentication adapters.
//!
//! Implementations of the `TokenProvider` port:
//!
//! - `static_token` - Swappable in-memory credential, also used in tests

mod static_token;

pub use static_token::StaticTokenProvider;
