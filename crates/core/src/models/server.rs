//! Server detail models for `GET /api/server/{id}`

use serde::{Deserialize, Serialize};

/// Raw response of the server detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerResponse {
    pub attributes: ServerAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerAttributes {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub relationships: Option<ServerRelationships>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerRelationships {
    #[serde(default)]
    pub allocations: Option<AllocationList>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationList {
    #[serde(default)]
    pub data: Vec<Allocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub attributes: AllocationAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationAttributes {
    #[serde(default)]
    pub ip_alias: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub port: String,
}

/// Flattened server summary shown next to the live status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub status: String,
    pub ip: Option<String>,
    pub port: Option<String>,
}

impl Default for ServerInfo {
    fn default() -> Self {
        ServerInfo {
            name: String::new(),
            status: "offline".to_string(),
            ip: None,
            port: None,
        }
    }
}

impl ServerResponse {
    /// Convert to ServerInfo, using the first allocation as the address
    pub fn into_server_info(self) -> ServerInfo {
        let attrs = self.attributes;
        let primary = attrs
            .relationships
            .and_then(|r| r.allocations)
            .and_then(|a| a.data.into_iter().next())
            .map(|a| a.attributes);

        ServerInfo {
            name: attrs.name,
            status: attrs.status.unwrap_or_else(|| "offline".to_string()),
            ip: primary.as_ref().and_then(|p| p.ip_alias.clone()),
            port: primary.map(|p| p.port).filter(|p| !p.is_empty()),
        }
    }
}

/// Deserialize a value that may be a string, number, or null into a String
pub(crate) fn deserialize_lenient_string<'de, D>(
    deserializer: D,
) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct LenientString;

    impl<'de> de::Visitor<'de> for LenientString {
        type Value = String;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_none<E: de::Error>(self) -> std::result::Result<String, E> {
            Ok(String::new())
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(LenientString)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_info_uses_first_allocation() {
        let body = r#"{
            "attributes": {
                "name": "Survival",
                "status": "running",
                "relationships": {
                    "allocations": {
                        "data": [
                            { "attributes": { "ip_alias": "play.example.net", "port": 25565 } },
                            { "attributes": { "ip_alias": "alt.example.net", "port": 25566 } }
                        ]
                    }
                }
            }
        }"#;
        let info = serde_json::from_str::<ServerResponse>(body)
            .unwrap()
            .into_server_info();

        assert_eq!(info.name, "Survival");
        assert_eq!(info.status, "running");
        assert_eq!(info.ip.as_deref(), Some("play.example.net"));
        assert_eq!(info.port.as_deref(), Some("25565"));
    }

    #[test]
    fn test_server_info_without_allocations() {
        let body = r#"{"attributes":{"name":"Lobby","status":null}}"#;
        let info = serde_json::from_str::<ServerResponse>(body)
            .unwrap()
            .into_server_info();

        assert_eq!(info.status, "offline");
        assert!(info.ip.is_none());
        assert!(info.port.is_none());
    }
}
