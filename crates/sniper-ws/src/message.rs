//! WebSocket control message types.

use crate::error::WsResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel prefix of the protobuf limit-depth push stream.
pub const LIMIT_DEPTH_CHANNEL: &str = "spot@public.limit.depth.v3.api.pb";

/// Depth subscription topic: one symbol at one book depth.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepthTopic {
    /// Exchange symbol (e.g., "BTCUSDT").
    pub symbol: String,
    /// Number of levels per side.
    pub depth: u32,
}

impl DepthTopic {
    pub fn new(symbol: impl Into<String>, depth: u32) -> Self {
        Self {
            symbol: symbol.into(),
            depth,
        }
    }

    /// Wire topic key: `<channel>@<symbol>@<depth>`.
    pub fn key(&self) -> String {
        format!("{}@{}@{}", LIMIT_DEPTH_CHANNEL, self.symbol, self.depth)
    }
}

impl fmt::Display for DepthTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Outgoing subscription request.
///
/// Format: `{"method": "SUBSCRIPTION", "params": ["<topic>"]}`
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionRequest {
    pub method: &'static str,
    pub params: Vec<String>,
}

impl SubscriptionRequest {
    /// Subscribe request for a single topic.
    pub fn subscribe(topic: &DepthTopic) -> Self {
        Self {
            method: "SUBSCRIPTION",
            params: vec![topic.key()],
        }
    }

    pub fn to_json(&self) -> WsResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Text reply from the exchange (subscription acks, errors).
///
/// Example: `{"id":0,"code":0,"msg":"spot@public.limit.depth.v3.api.pb@BTCUSDT@20"}`
#[derive(Debug, Clone, Deserialize)]
pub struct ControlReply {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl ControlReply {
    /// A reply is a success when its code is absent or 0 and the exchange
    /// did not report the topic as rejected (rejections still carry code 0).
    pub fn is_success(&self) -> bool {
        let code_ok = self.code.map_or(true, |c| c == 0);
        let rejected = self
            .msg
            .as_deref()
            .is_some_and(|m| m.contains("Not Subscribed"));
        code_ok && !rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_key() {
        let topic = DepthTopic::new("BTCUSDT", 20);
        assert_eq!(
            topic.key(),
            "spot@public.limit.depth.v3.api.pb@BTCUSDT@20"
        );
    }

    #[test]
    fn test_subscription_request_json() {
        let json = SubscriptionRequest::subscribe(&DepthTopic::new("ETHUSDT", 5))
            .to_json()
            .unwrap();
        assert_eq!(
            json,
            r#"{"method":"SUBSCRIPTION","params":["spot@public.limit.depth.v3.api.pb@ETHUSDT@5"]}"#
        );
    }

    #[test]
    fn test_control_reply() {
        let ok: ControlReply =
            serde_json::from_str(r#"{"id":0,"code":0,"msg":"spot@x@BTCUSDT@20"}"#).unwrap();
        assert!(ok.is_success());

        let blocked: ControlReply =
            serde_json::from_str(r#"{"id":0,"code":0,"msg":"Not Subscribed successfully! [x]. Reason： Blocked!"}"#)
                .unwrap();
        assert!(!blocked.is_success());

        let err: ControlReply = serde_json::from_str(r#"{"code":400,"msg":"bad"}"#).unwrap();
        assert!(!err.is_success());
    }
}
