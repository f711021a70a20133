//! Node and radar models for the admin pages

use super::admin::ListMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a node is hosted
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeLocation {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

/// A game-server node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(deserialize_with = "crate::models::server::deserialize_lenient_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fqdn: String,
    /// Megabytes
    #[serde(default)]
    pub memory: u64,
    /// Megabytes
    #[serde(default)]
    pub disk: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub location: Option<NodeLocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeEnvelope {
    pub attributes: Node,
}

/// Response from `GET /api/nodes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeListResponse {
    #[serde(default)]
    pub data: Vec<NodeEnvelope>,
    #[serde(default)]
    pub meta: ListMeta,
}

impl NodeListResponse {
    pub fn into_nodes(self) -> Vec<Node> {
        self.data.into_iter().map(|n| n.attributes).collect()
    }
}

/// Detection counters reported by a radar node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RadarStats {
    #[serde(default)]
    pub total_detections: u64,
    #[serde(default)]
    pub recent_detections: u64,
    #[serde(default)]
    pub detection_types: BTreeMap<String, u64>,
}

/// Entry from `GET /api/radar/nodes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarNode {
    #[serde(deserialize_with = "crate::models::server::deserialize_lenient_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fqdn: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub stats: Option<RadarStats>,
}

/// Response from `GET /api/radar/nodes/{id}`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RadarNodeDetail {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub stats: RadarStats,
}

impl RadarNodeDetail {
    pub fn is_online(&self) -> bool {
        self.status == "online"
    }
}

/// Body of `POST /api/radar/nodes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRadarNode {
    pub name: String,
    pub fqdn: String,
    pub port: u16,
    pub webhook_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_list_unwraps_attributes() {
        let json = r#"{
            "data": [
                {"attributes": {"id": 1, "name": "eu-1", "fqdn": "eu1.example.net",
                    "memory": 32768, "disk": 512000,
                    "location": {"city": "Frankfurt", "country": "DE"}}},
                {"attributes": {"id": "2", "name": "us-1"}}
            ],
            "meta": {"pagination": {"total": 2}}
        }"#;

        let resp: NodeListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.meta.total(), 2);
        let nodes = resp.into_nodes();
        assert_eq!(nodes[0].id, "1");
        assert_eq!(nodes[0].location.as_ref().unwrap().city, "Frankfurt");
        assert_eq!(nodes[1].fqdn, "");
        assert_eq!(nodes[1].location, None);
    }

    #[test]
    fn test_radar_detail() {
        let json = r#"{"status":"online","stats":{"total_detections":12,
            "recent_detections":3,"detection_types":{"miner":2,"ddos":1}}}"#;
        let detail: RadarNodeDetail = serde_json::from_str(json).unwrap();
        assert!(detail.is_online());
        assert_eq!(detail.stats.detection_types["miner"], 2);
    }

    #[test]
    fn test_new_radar_node_uses_camel_case() {
        let body = serde_json::to_value(NewRadarNode {
            name: "radar-1".to_string(),
            fqdn: "radar1.example.net".to_string(),
            port: 8080,
            webhook_url: "https://hooks.example.net/x".to_string(),
        })
        .unwrap();
        assert_eq!(body["webhookUrl"], "https://hooks.example.net/x");
    }
}
