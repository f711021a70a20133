//! User-related models

use serde::{Deserialize, Serialize};

/// Response from `GET /api/user`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub username: String,
    #[serde(default, deserialize_with = "crate::models::server::deserialize_lenient_string")]
    pub id: String,
}

impl UserInfo {
    /// Placeholder shown when the user endpoint is unreachable
    pub fn fallback() -> Self {
        UserInfo {
            username: "User".to_string(),
            id: "00000".to_string(),
        }
    }
}

/// Response from `GET /api/admin`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdminStatusResponse {
    #[serde(default)]
    pub admin: bool,
}

/// Response from `GET /api/coins`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoinsResponse {
    #[serde(default)]
    pub coins: f64,
}
