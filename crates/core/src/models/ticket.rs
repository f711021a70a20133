//! Socket ticket returned by `GET /api/server/{id}/websocket`

use serde::{Deserialize, Serialize};

/// One-time credentials for opening a live status socket
///
/// Tickets are short-lived and may be single-use, so a fresh one is
/// requested for every connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTicket {
    #[serde(rename = "socket")]
    pub socket_url: String,
    #[serde(rename = "token")]
    pub auth_token: String,
}

/// Envelope of the websocket ticket endpoint: `{ "data": { "socket", "token" } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsocketTicketResponse {
    pub data: ConnectionTicket,
}

impl WebsocketTicketResponse {
    pub fn into_ticket(self) -> ConnectionTicket {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ticket_envelope() {
        let body = r#"{"data":{"socket":"wss://node1.example.net:8080/api/servers/abc/ws","token":"eyJ0eXAi"}}"#;
        let ticket = serde_json::from_str::<WebsocketTicketResponse>(body)
            .unwrap()
            .into_ticket();

        assert_eq!(ticket.socket_url, "wss://node1.example.net:8080/api/servers/abc/ws");
        assert_eq!(ticket.auth_token, "eyJ0eXAi");
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let body = r#"{"data":{"socket":"wss://node1.example.net/ws"}}"#;
        assert!(serde_json::from_str::<WebsocketTicketResponse>(body).is_err());
    }
}
