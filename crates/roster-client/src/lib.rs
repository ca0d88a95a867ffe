/// Roster client: validated CRUD against a remote `/users` collection.
///
/// Every operation returns the `Response` envelope from `roster-types`:
/// expected failures (bad input, missing record, timeout, transport) are
/// reported through the envelope, never as panics or `Err`. The only
/// eager errors are construction-time misuse (missing configuration,
/// malformed base URL).
pub mod config;
pub mod debounce;
pub mod dispatch;
pub mod users;
pub mod validate;

// Re-export the working set for convenience.
pub use config::{ClientConfig, ConfigError};
pub use debounce::Debouncer;
pub use dispatch::{Dispatcher, Method};
pub use users::UserClient;
