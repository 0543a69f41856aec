//! Data models exchanged with the DayFlow API.
//!
//! - `User`: the authenticated principal returned by `/auth/me` and `/auth/login`
//! - `LoginRequest`, `LoginResponse`: the login exchange

pub mod user;

pub use user::{LoginRequest, LoginResponse, MeResponse, User};
