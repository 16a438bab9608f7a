//! Client-side session engine for the boutique admin frontend.
//!
//! The remote REST API owns all business logic; this crate owns what the
//! client believes about who is signed in:
//!
//! - `credentials`: the durable token + identity record on a `KVStore`
//! - `session`: the state container and its actions (login, logout, ...)
//! - `permission`: pure permission and role checks
//! - `guard` / `routes`: which view a path renders for a session snapshot
//! - `api`: the REST calls, behind the `AuthApi` trait

pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod identity;
pub mod permission;
pub mod preferences;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;

pub use api::{AuthApi, HttpAuthApi, RegisterRequest};
pub use config::SessionConfig;
pub use credentials::CredentialStore;
pub use error::{ApiError, SessionError};
pub use guard::GuardDecision;
pub use identity::{Identity, Role};
pub use preferences::ThemePreferences;
pub use routes::{Navigation, Router, View};
pub use session::SessionManager;
pub use state::{Session, SessionPhase};
pub use store::SubscriptionId;
