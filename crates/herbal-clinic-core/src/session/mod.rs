//! Signed-in session: tokens, user type and where the user lands.
//!
//! A [`Session`] is handed explicitly to every API call; [`SessionStore`]
//! keeps it across restarts.

mod schema;
mod store;

pub use schema::*;
pub use store::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session storage errors.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Warehouse / production staff
    Logistic,
    /// Clinic staff; also any unrecognised role
    #[serde(other)]
    Clinic,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Logistic => "logistic",
            Self::Clinic => "clinic",
        }
    }

    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("logistic") {
            Self::Logistic
        } else {
            Self::Clinic
        }
    }
}

/// First page after sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    LogisticsDashboard,
    Patients,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub username: String,
    pub user_type: UserType,
}

impl Session {
    pub fn landing(&self) -> Landing {
        match self.user_type {
            UserType::Logistic => Landing::LogisticsDashboard,
            UserType::Clinic => Landing::Patients,
        }
    }
}

/// Response of `POST /api/token/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user_type: Option<String>,
}

impl TokenPair {
    pub fn into_session(self, username: impl Into<String>) -> Session {
        let user_type = self
            .user_type
            .as_deref()
            .map(UserType::parse)
            .unwrap_or(UserType::Clinic);
        Session {
            access_token: self.access,
            refresh_token: self.refresh,
            username: username.into(),
            user_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_by_user_type() {
        let pair: TokenPair =
            serde_json::from_str(r#"{"access": "a", "refresh": "r", "user_type": "logistic"}"#)
                .unwrap();
        let session = pair.into_session("depo1");
        assert_eq!(session.landing(), Landing::LogisticsDashboard);

        let pair: TokenPair = serde_json::from_str(r#"{"access": "a", "refresh": "r"}"#).unwrap();
        assert_eq!(pair.into_session("dr").landing(), Landing::Patients);
    }

    #[test]
    fn test_unknown_user_type_is_clinic() {
        assert_eq!(UserType::parse("admin"), UserType::Clinic);
        let t: UserType = serde_json::from_str(r#""doctor""#).unwrap();
        assert_eq!(t, UserType::Clinic);
    }
}
