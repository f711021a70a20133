//! Support ticket models for the admin desk

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticket urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
            TicketPriority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TicketPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(TicketPriority::Low),
            "medium" => Ok(TicketPriority::Medium),
            "high" => Ok(TicketPriority::High),
            "urgent" => Ok(TicketPriority::Urgent),
            other => Err(Error::InvalidData(format!("unknown ticket priority: {}", other))),
        }
    }
}

/// Whether a ticket still needs attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Closed => "closed",
        }
    }

    /// The status the desk's open/close toggle moves to
    pub fn toggled(self) -> Self {
        match self {
            TicketStatus::Open => TicketStatus::Closed,
            TicketStatus::Closed => TicketStatus::Open,
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(TicketStatus::Open),
            "closed" => Ok(TicketStatus::Closed),
            other => Err(Error::InvalidData(format!("unknown ticket status: {}", other))),
        }
    }
}

/// Author of a ticket
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TicketUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// One message in a ticket thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketMessage {
    pub content: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default, deserialize_with = "crate::models::server::deserialize_lenient_string")]
    pub timestamp: String,
}

/// Entry from `GET /api/tickets/all` and `GET /api/tickets/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportTicket {
    #[serde(deserialize_with = "crate::models::server::deserialize_lenient_string")]
    pub id: String,
    pub subject: String,
    #[serde(default)]
    pub category: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    #[serde(default)]
    pub user: TicketUser,
    #[serde(default)]
    pub messages: Vec<TicketMessage>,
}

/// Response from `GET /api/tickets/stats`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub open: u64,
    /// Milliseconds
    #[serde(default)]
    pub average_response_time: f64,
    #[serde(default)]
    pub tickets_last_week: u64,
}

impl TicketStats {
    pub fn average_response_minutes(&self) -> f64 {
        self.average_response_time / 60_000.0
    }
}

/// Body of `POST /api/tickets/{id}/messages`
#[derive(Debug, Clone, Serialize)]
pub struct TicketReply<'a> {
    pub content: &'a str,
}

/// Body of `PATCH /api/tickets/{id}/status`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TicketStatusUpdate {
    pub status: TicketStatus,
}

/// Body of `PATCH /api/tickets/{id}/priority`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TicketPriorityUpdate {
    pub priority: TicketPriority,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_from_desk_payload() {
        let json = r#"{
            "id": 17,
            "subject": "Server won't start",
            "category": "technical",
            "priority": "urgent",
            "status": "open",
            "user": {"username": "alice", "email": "alice@example.net"},
            "messages": [
                {"content": "help", "isStaff": false, "timestamp": "2024-03-01T10:00:00Z"},
                {"content": "Ticket opened", "isSystem": true, "timestamp": 1709287200000}
            ]
        }"#;

        let ticket: SupportTicket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.id, "17");
        assert_eq!(ticket.priority, TicketPriority::Urgent);
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.user.username, "alice");
        assert!(ticket.messages[1].is_system);
        assert_eq!(ticket.messages[1].timestamp, "1709287200000");
    }

    #[test]
    fn test_stats_minutes() {
        let stats: TicketStats = serde_json::from_str(
            r#"{"total":40,"open":6,"averageResponseTime":450000,"ticketsLastWeek":9}"#,
        )
        .unwrap();
        assert_eq!(stats.tickets_last_week, 9);
        assert_eq!(stats.average_response_minutes(), 7.5);
    }

    #[test]
    fn test_status_toggle_and_parse() {
        assert_eq!(TicketStatus::Open.toggled(), TicketStatus::Closed);
        assert_eq!("CLOSED".parse::<TicketStatus>().unwrap(), TicketStatus::Closed);
        assert!("pending".parse::<TicketPriority>().is_err());
    }

    #[test]
    fn test_update_bodies() {
        let body = serde_json::to_string(&TicketPriorityUpdate {
            priority: TicketPriority::High,
        })
        .unwrap();
        assert_eq!(body, r#"{"priority":"high"}"#);
    }
}
