//! Client core for the rentals app.
//!
//! ARCHITECTURE
//! ============
//! `net` wraps the REST API (auth and property endpoints) behind typed
//! services. `state` owns what the app keeps between calls: the signed-in
//! session, the listing browser filters, and the wishlist. `validation` holds
//! the form schemas checked before anything is submitted. `util` carries the
//! key-value storage backends and JWT claim decoding the session relies on.
//!
//! Front-ends (the `cli` package here) only talk to `state` and `net`.

pub mod config;
pub mod net;
pub mod state;
pub mod util;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ClientConfig, ConfigError};
pub use net::api::{ApiClient, ApiError};
pub use net::auth::AuthService;
pub use net::property::PropertyService;
pub use state::auth::{AuthState, AuthStore, AuthStoreError};
pub use state::listings::{ListingFilter, SortOrder};
pub use state::wishlist::Wishlist;
pub use util::storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use validation::{FieldError, Validate, ValidationErrors};
