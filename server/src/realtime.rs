//! Fire-and-forget publisher for the realtime relay.
//!
//! The relay holds one websocket per subscribed user; the server pushes JSON
//! envelopes at it over HTTP (`POST /v0/publish/:user_id`). Delivery is
//! best-effort by design: the notification row in the database is the durable
//! copy, so publish failures are logged and dropped.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

/// Envelope forwarded verbatim to the subscriber's socket.
#[derive(Serialize, Debug, Clone)]
pub struct RealtimeEvent {
    pub event: String,
    pub data: Value,
}

impl RealtimeEvent {
    pub fn new(event: &str, data: Value) -> Self {
        RealtimeEvent {
            event: event.to_string(),
            data,
        }
    }
}

#[derive(Clone)]
pub struct RealtimeClient {
    http: reqwest::Client,
    base_url: String,
}

impl RealtimeClient {
    pub fn new(base_url: String) -> Self {
        RealtimeClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Pushes one event at `recipient`. Never fails the caller; a 404 simply
    /// means nobody is subscribed right now.
    pub async fn publish(&self, recipient: Uuid, event: RealtimeEvent) {
        let url = format!("{}/v0/publish/{}", self.base_url, recipient);
        match self.http.post(&url).json(&event).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(recipient = %recipient, event = %event.event, "Published realtime event");
            }
            Ok(resp) => {
                debug!(
                    recipient = %recipient,
                    event = %event.event,
                    status = %resp.status(),
                    "Relay did not deliver event"
                );
            }
            Err(e) => {
                warn!(recipient = %recipient, event = %event.event, error = %e, "Relay publish failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_shape_matches_the_relay_contract() {
        let event = RealtimeEvent::new("message:new", json!({ "content": "hi" }));
        let encoded = serde_json::to_value(&event).unwrap();
        assert_eq!(
            encoded,
            json!({ "event": "message:new", "data": { "content": "hi" } })
        );
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = RealtimeClient::new("http://localhost:8081/".to_string());
        assert_eq!(client.base_url, "http://localhost:8081");
    }
}
