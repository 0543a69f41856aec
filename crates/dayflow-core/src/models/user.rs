use serde::{Deserialize, Serialize};

use crate::auth::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: Role,
    #[serde(default, alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(default, alias = "last_name")]
    pub last_name: Option<String>,
    #[serde(default, alias = "employee_id")]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

impl User {
    /// Name shown in the header and navigation, falling back to the email
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Body of `POST /auth/login`.
///
/// The identifier and secret are also sent under `email` / `password` so the
/// same request works against servers that use either naming.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub identifier: &'a str,
    pub secret: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

impl<'a> LoginRequest<'a> {
    pub fn new(identifier: &'a str, secret: &'a str) -> Self {
        Self {
            identifier,
            secret,
            email: identifier,
            password: secret,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// `GET /auth/me` returns either the bare user or `{ "user": ... }`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MeResponse {
    Wrapped { user: User },
    Bare(User),
}

impl MeResponse {
    pub fn into_user(self) -> User {
        match self {
            MeResponse::Wrapped { user } | MeResponse::Bare(user) => user,
        }
    }
}
