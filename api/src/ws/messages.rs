//! WebSocket message types.
//!
//! Defines the message format for client-server communication. Both
//! directions are flat JSON objects whose fields are all optional and
//! handled independently.

use mempulse_chain::{Block, MempoolBlock, MempoolInfo, Statistic, Transaction};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Control action requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Replace the set of wanted topics.
    Want,
    /// Request the initial state snapshot.
    Init,
    /// Keepalive.
    Ping,
}

impl Action {
    /// Parses an action name.
    #[must_use]
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "want" => Some(Self::Want),
            "init" => Some(Self::Init),
            "ping" => Some(Self::Ping),
            _ => None,
        }
    }
}

/// Broadcast topic a client can want.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// New blocks.
    Blocks,
    /// Mempool-block projection.
    MempoolBlocks,
    /// Live two-hour chart statistics.
    LiveChart,
    /// Mempool info and throughput.
    Stats,
}

impl Topic {
    /// Parses a topic name.
    #[must_use]
    pub fn parse(topic: &str) -> Option<Self> {
        match topic {
            "blocks" => Some(Self::Blocks),
            "mempool-blocks" => Some(Self::MempoolBlocks),
            "live-2h-chart" => Some(Self::LiveChart),
            "stats" => Some(Self::Stats),
            _ => None,
        }
    }
}

/// Message sent from client to server.
///
/// Fields are kept as raw JSON so that a badly typed field only affects
/// itself instead of rejecting the whole message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientMessage {
    /// Requested action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,

    /// Topic list for `want`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Transaction id to track.
    #[serde(rename = "track-tx", default, skip_serializing_if = "Option::is_none")]
    pub track_tx: Option<Value>,

    /// Whether to resolve `track-tx` against the mempool right away.
    #[serde(
        rename = "watch-mempool",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub watch_mempool: Option<Value>,

    /// Address to track.
    #[serde(
        rename = "track-address",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub track_address: Option<Value>,
}

impl ClientMessage {
    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object.
    pub fn parse(text: &str) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(ApiError::InvalidMessage(
                "expected a JSON object".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Returns the requested action, if it is a known one.
    #[must_use]
    pub fn action(&self) -> Option<Action> {
        self.action.as_ref()?.as_str().and_then(Action::parse)
    }

    /// Returns the topic names in `data`, if it is a list.
    ///
    /// Non-string entries are skipped.
    #[must_use]
    pub fn topics(&self) -> Option<Vec<&str>> {
        let topics = self.data.as_ref()?.as_array()?;
        Some(topics.iter().filter_map(Value::as_str).collect())
    }

    /// Returns the `track-tx` candidate.
    ///
    /// A non-string value yields an empty candidate, which never validates.
    #[must_use]
    pub fn track_tx(&self) -> Option<&str> {
        self.track_tx
            .as_ref()
            .map(|value| value.as_str().unwrap_or_default())
    }

    /// Returns the `track-address` candidate.
    ///
    /// A non-string value yields an empty candidate, which never validates.
    #[must_use]
    pub fn track_address(&self) -> Option<&str> {
        self.track_address
            .as_ref()
            .map(|value| value.as_str().unwrap_or_default())
    }

    /// Returns true if `watch-mempool` is truthy.
    #[must_use]
    pub fn watch_mempool(&self) -> bool {
        self.watch_mempool.as_ref().is_some_and(is_truthy)
    }
}

/// JavaScript-style truthiness of a JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Message sent from server to client.
///
/// Only the fields that are set are serialized, so one type covers the init
/// reply, the ping/tx reply and every broadcast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerMessage {
    /// Aggregate mempool information.
    #[serde(rename = "mempoolInfo", default, skip_serializing_if = "Option::is_none")]
    pub mempool_info: Option<MempoolInfo>,

    /// Incoming vbytes per second.
    #[serde(
        rename = "vBytesPerSecond",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub vbytes_per_second: Option<u64>,

    /// Recent blocks, oldest first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Block>>,

    /// Fiat price for the configured pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversions: Option<f64>,

    /// Mempool-block projection.
    #[serde(
        rename = "mempool-blocks",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub mempool_blocks: Option<Vec<MempoolBlock>>,

    /// Build identifier.
    #[serde(rename = "git-commit", default, skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,

    /// Reply to a ping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pong: Option<bool>,

    /// A tracked transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx: Option<Transaction>,

    /// Live-chart statistic.
    #[serde(
        rename = "live-2h-chart",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub live_chart: Option<Statistic>,

    /// A new block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<Block>,

    /// The tracked transaction was confirmed.
    #[serde(rename = "txConfirmed", default, skip_serializing_if = "Option::is_none")]
    pub tx_confirmed: Option<bool>,

    /// New mempool transactions touching the tracked address.
    #[serde(
        rename = "address-transactions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub address_transactions: Option<Vec<Transaction>>,

    /// Newly confirmed transactions touching the tracked address.
    #[serde(
        rename = "address-block-transactions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub address_block_transactions: Option<Vec<Transaction>>,
}

impl ServerMessage {
    /// Creates a pong message.
    #[must_use]
    pub fn pong() -> Self {
        Self {
            pong: Some(true),
            ..Default::default()
        }
    }

    /// Creates a live-chart message.
    #[must_use]
    pub fn live_chart(stat: Statistic) -> Self {
        Self {
            live_chart: Some(stat),
            ..Default::default()
        }
    }

    /// Creates a new-block message.
    #[must_use]
    pub fn block(block: Block) -> Self {
        Self {
            block: Some(block),
            ..Default::default()
        }
    }

    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse() {
        assert_eq!(Action::parse("want"), Some(Action::Want));
        assert_eq!(Action::parse("init"), Some(Action::Init));
        assert_eq!(Action::parse("ping"), Some(Action::Ping));
        assert_eq!(Action::parse("subscribe"), None);
    }

    #[test]
    fn test_topic_parse() {
        assert_eq!(Topic::parse("blocks"), Some(Topic::Blocks));
        assert_eq!(Topic::parse("mempool-blocks"), Some(Topic::MempoolBlocks));
        assert_eq!(Topic::parse("live-2h-chart"), Some(Topic::LiveChart));
        assert_eq!(Topic::parse("stats"), Some(Topic::Stats));
        assert_eq!(Topic::parse("fees"), None);
    }

    #[test]
    fn test_parse_want() {
        let msg = ClientMessage::parse(r#"{"action":"want","data":["blocks","stats"]}"#)
            .expect("parse");
        assert_eq!(msg.action(), Some(Action::Want));
        assert_eq!(msg.topics(), Some(vec!["blocks", "stats"]));
    }

    #[test]
    fn test_parse_topics_skips_non_strings() {
        let msg = ClientMessage::parse(r#"{"action":"want","data":["blocks",4,null]}"#)
            .expect("parse");
        assert_eq!(msg.topics(), Some(vec!["blocks"]));
    }

    #[test]
    fn test_parse_topics_not_a_list() {
        let msg = ClientMessage::parse(r#"{"action":"want","data":"blocks"}"#).expect("parse");
        assert!(msg.topics().is_none());
    }

    #[test]
    fn test_parse_track_fields() {
        let msg = ClientMessage::parse(
            r#"{"track-tx":"abc","watch-mempool":true,"track-address":"bc1qxyz"}"#,
        )
        .expect("parse");
        assert_eq!(msg.track_tx(), Some("abc"));
        assert!(msg.watch_mempool());
        assert_eq!(msg.track_address(), Some("bc1qxyz"));
        assert!(msg.action().is_none());
    }

    #[test]
    fn test_parse_track_non_string() {
        let msg = ClientMessage::parse(r#"{"track-tx":42,"track-address":null}"#).expect("parse");
        assert_eq!(msg.track_tx(), Some(""));
        assert!(msg.track_address().is_none());
    }

    #[test]
    fn test_watch_mempool_truthiness() {
        let cases = [
            (r#"{"watch-mempool":1}"#, true),
            (r#"{"watch-mempool":"yes"}"#, true),
            (r#"{"watch-mempool":0}"#, false),
            (r#"{"watch-mempool":""}"#, false),
            (r#"{"watch-mempool":false}"#, false),
            (r#"{}"#, false),
        ];
        for (json, expected) in cases {
            let msg = ClientMessage::parse(json).expect("parse");
            assert_eq!(msg.watch_mempool(), expected, "{}", json);
        }
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(ClientMessage::parse("{not json").is_err());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(ClientMessage::parse("[1,2,3]").is_err());
        assert!(ClientMessage::parse("\"ping\"").is_err());
        assert!(ClientMessage::parse("null").is_err());
    }

    #[test]
    fn test_server_message_pong() {
        let json = serde_json::to_string(&ServerMessage::pong()).expect("serialize");
        assert_eq!(json, r#"{"pong":true}"#);
    }

    #[test]
    fn test_server_message_empty() {
        assert!(ServerMessage::default().is_empty());
        assert!(!ServerMessage::pong().is_empty());
        let json = serde_json::to_string(&ServerMessage::default()).expect("serialize");
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_server_message_field_names() {
        let msg = ServerMessage {
            vbytes_per_second: Some(1200),
            mempool_blocks: Some(Vec::new()),
            git_commit: Some(String::new()),
            tx_confirmed: Some(true),
            address_transactions: Some(Vec::new()),
            address_block_transactions: Some(Vec::new()),
            ..Default::default()
        };
        let json = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(json["vBytesPerSecond"], 1200);
        assert!(json["mempool-blocks"].is_array());
        assert_eq!(json["git-commit"], "");
        assert_eq!(json["txConfirmed"], true);
        assert!(json["address-transactions"].is_array());
        assert!(json["address-block-transactions"].is_array());
    }
}
