//! Shared type definitions and newtypes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque server identifier (the `{id}` path segment of server routes)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(pub String);

impl ServerId {
    pub fn new(id: impl Into<String>) -> Self {
        ServerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServerId {
    fn from(id: &str) -> Self {
        ServerId(id.to_string())
    }
}

/// Power action accepted by the `set state` socket event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerAction {
    Start,
    Restart,
    Stop,
}

impl PowerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerAction::Start => "start",
            PowerAction::Restart => "restart",
            PowerAction::Stop => "stop",
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PowerAction {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(PowerAction::Start),
            "restart" => Ok(PowerAction::Restart),
            "stop" => Ok(PowerAction::Stop),
            other => Err(crate::Error::InvalidData(format!(
                "unknown power action: {}",
                other
            ))),
        }
    }
}

/// Last known status of a server, as pushed by the live socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: String,
}

impl StatusSnapshot {
    pub fn new(status: impl Into<String>) -> Self {
        StatusSnapshot {
            status: status.into(),
        }
    }
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        StatusSnapshot::new("offline")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_action_parse() {
        assert_eq!("Stop".parse::<PowerAction>().unwrap(), PowerAction::Stop);
        assert_eq!("restart".parse::<PowerAction>().unwrap(), PowerAction::Restart);
        assert!("reboot".parse::<PowerAction>().is_err());
    }

    #[test]
    fn test_power_action_serializes_lowercase() {
        let json = serde_json::to_string(&PowerAction::Restart).unwrap();
        assert_eq!(json, "\"restart\"");
    }

    #[test]
    fn test_default_snapshot_is_offline() {
        assert_eq!(StatusSnapshot::default().status, "offline");
    }
}
