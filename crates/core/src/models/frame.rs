//! JSON frames exchanged over the live status socket
//!
//! Every message in either direction has the shape
//! `{ "event": string, "args": [...] }`.

use crate::{Error, PowerAction, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EVENT_AUTH: &str = "auth";
pub const EVENT_AUTH_SUCCESS: &str = "auth success";
pub const EVENT_SEND_STATS: &str = "send stats";
pub const EVENT_SET_STATE: &str = "set state";
pub const EVENT_STATUS: &str = "status";

/// Raw socket frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl Frame {
    pub fn new(event: impl Into<String>, args: Vec<Value>) -> Self {
        Frame {
            event: event.into(),
            args,
        }
    }

    /// `{ "event": "auth", "args": [token] }`
    pub fn auth(token: &str) -> Self {
        Frame::new(EVENT_AUTH, vec![Value::String(token.to_string())])
    }

    /// `{ "event": "send stats", "args": [null] }`
    pub fn send_stats() -> Self {
        Frame::new(EVENT_SEND_STATS, vec![Value::Null])
    }

    /// `{ "event": "set state", "args": [action] }`
    pub fn set_state(action: PowerAction) -> Self {
        Frame::new(EVENT_SET_STATE, vec![Value::String(action.as_str().to_string())])
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Interpret an inbound frame
    pub fn into_inbound(self) -> Result<InboundEvent> {
        match self.event.as_str() {
            EVENT_AUTH_SUCCESS => Ok(InboundEvent::AuthSuccess),
            EVENT_STATUS => match self.args.into_iter().next() {
                Some(Value::String(status)) => Ok(InboundEvent::Status(status)),
                other => Err(Error::InvalidData(format!(
                    "status event without a string argument: {:?}",
                    other
                ))),
            },
            _ => Ok(InboundEvent::Other(self.event)),
        }
    }
}

/// Inbound event kinds the client acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    AuthSuccess,
    Status(String),
    /// Any event kind the client does not handle (console output, stats, ...)
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_frames_match_wire_shape() {
        assert_eq!(
            Frame::auth("tok").to_json().unwrap(),
            r#"{"event":"auth","args":["tok"]}"#
        );
        assert_eq!(
            Frame::send_stats().to_json().unwrap(),
            r#"{"event":"send stats","args":[null]}"#
        );
        assert_eq!(
            Frame::set_state(PowerAction::Stop).to_json().unwrap(),
            r#"{"event":"set state","args":["stop"]}"#
        );
    }

    #[test]
    fn test_inbound_status() {
        let event = Frame::parse(r#"{"event":"status","args":["starting"]}"#)
            .unwrap()
            .into_inbound()
            .unwrap();
        assert_eq!(event, InboundEvent::Status("starting".to_string()));
    }

    #[test]
    fn test_inbound_auth_success_without_args() {
        let event = Frame::parse(r#"{"event":"auth success"}"#)
            .unwrap()
            .into_inbound()
            .unwrap();
        assert_eq!(event, InboundEvent::AuthSuccess);
    }

    #[test]
    fn test_status_without_argument_is_invalid() {
        let frame = Frame::parse(r#"{"event":"status","args":[]}"#).unwrap();
        assert!(frame.into_inbound().is_err());
    }

    #[test]
    fn test_unknown_event_passes_through() {
        let event = Frame::parse(r#"{"event":"console output","args":["[INFO] Done"]}"#)
            .unwrap()
            .into_inbound()
            .unwrap();
        assert_eq!(event, InboundEvent::Other("console output".to_string()));
    }

    #[test]
    fn test_malformed_payload() {
        assert!(Frame::parse("not json").is_err());
        assert!(Frame::parse(r#"{"args":[]}"#).is_err());
    }
}
