//! DayFlow HRMS client core.
//!
//! This crate holds the authentication and authorization gating path used by
//! the DayFlow front ends:
//!
//! - `auth::TokenStore`: durable, origin-scoped bearer credential storage
//! - `api::ApiClient`: HTTP gateway that attaches the stored credential
//! - `auth::SessionManager`: owns the current session (single writer)
//! - `auth::RouteGuard`: decides whether a view renders or redirects
//! - `navigation`: route table and role-appropriate navigation

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod navigation;
pub mod secrets;

pub use api::{ApiClient, ApiError};
pub use auth::{
    Access, Credential, GuardDecision, LoginError, Role, RouteGuard, Session, SessionManager,
    SessionState, TokenStore,
};
pub use config::{Config, TokenBackend};
pub use models::User;
pub use navigation::{Navigator, RecordingNavigator, Route};
