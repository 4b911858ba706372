//! Authentication and session management.
//!
//! - `session`: the in-memory token/profile cell injected into the gateway
//! - `credentials`: durable credential storage
//! - `service`: login, registration, refresh, logout, hydrate

pub mod credentials;
pub mod service;
pub mod session;

pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use service::AuthService;
pub use session::{PersistedSession, SessionContext, TokenPair, UserProfile};
