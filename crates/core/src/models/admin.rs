//! Panel-wide admin models: list metadata, config backups, reboot state

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
}

/// `meta` block of the paginated list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ListMeta {
    #[serde(default)]
    pub pagination: Pagination,
}

impl ListMeta {
    pub fn total(&self) -> u64 {
        self.pagination.total
    }
}

/// Any list response, read only for its total
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ListTotalResponse {
    #[serde(default)]
    pub meta: ListMeta,
}

/// Servers, users, and nodes known to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemCounts {
    pub servers: u64,
    pub users: u64,
    pub nodes: u64,
}

/// Entry from `GET /api/config/backups`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigBackup {
    pub name: String,
    #[serde(default, deserialize_with = "crate::models::server::deserialize_lenient_string")]
    pub timestamp: String,
}

/// Response from `GET /api/reboot/status`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebootStatus {
    #[serde(default)]
    pub needs_reboot: bool,
}

/// `{"error": "..."}` body the panel sends with a failed request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: String,
}

impl ApiErrorBody {
    /// The panel's error message, or the raw body when it sent none
    pub fn message_from(body: &str) -> String {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) if !parsed.error.is_empty() => parsed.error,
            _ => body.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_meta_counts_zero() {
        let resp: ListTotalResponse = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert_eq!(resp.meta.total(), 0);
    }

    #[test]
    fn test_error_message_from_body() {
        assert_eq!(
            ApiErrorBody::message_from(r#"{"error":"Deployment failed"}"#),
            "Deployment failed"
        );
        assert_eq!(ApiErrorBody::message_from("Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn test_reboot_status() {
        let status: RebootStatus = serde_json::from_str(r#"{"needsReboot":true}"#).unwrap();
        assert!(status.needs_reboot);
    }
}
