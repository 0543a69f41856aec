//! Authentication and authorization gating.
//!
//! This module provides:
//! - `TokenStore`: durable, origin-scoped bearer credential storage
//!   (`FileTokenStore`, `KeyringTokenStore`, `MemoryTokenStore`)
//! - `Session`: snapshot of the current principal with derived flags
//! - `SessionManager`: bootstrap, login and logout; the only session writer
//! - `RouteGuard`: render / loading / redirect decisions for protected views
//!
//! Tokens carry no client-side expiry; the server revalidates every request.

pub mod credentials;
pub mod guard;
pub mod role;
pub mod session;
pub mod state;
pub mod token_store;

pub use credentials::KeyringTokenStore;
pub use guard::{Access, GuardDecision, RouteGuard};
pub use role::{is_admin_role, Role, ADMIN_ROLES};
pub use session::{LoginError, SessionManager, GENERIC_LOGIN_FAILURE};
pub use state::{Session, SessionState};
pub use token_store::{origin_of, Credential, FileTokenStore, MemoryTokenStore, TokenStore};
