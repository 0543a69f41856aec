//! REST API client module for the DayFlow HRMS server.
//!
//! The API uses bearer token authentication; the token is obtained from
//! `POST /auth/login` and validated with `GET /auth/me`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::{ApiError, ErrorKind};
