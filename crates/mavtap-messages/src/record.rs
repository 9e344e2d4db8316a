use std::borrow::Cow;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::registry::MessageRegistry;
use crate::types::MessagePayload;

/// One decoded datagram.
///
/// Serializes to the event shape subscribers consume:
/// ```text
/// {"msgId":74,"type":"VFR_HUD","sysid":1,"compid":1,"vfrHud":{...}}
/// ```
/// Unrecognized messages carry `"type":"UNKNOWN_<id>"` and no payload key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    #[serde(rename = "msgId")]
    pub message_id: u8,
    #[serde(rename = "type")]
    pub type_name: Cow<'static, str>,
    #[serde(rename = "sysid")]
    pub system_id: u8,
    #[serde(rename = "compid")]
    pub component_id: u8,
    #[serde(flatten)]
    pub payload: Option<MessagePayload>,
}

impl TelemetryRecord {
    /// True when no decoder was registered for the message id.
    pub fn is_unknown(&self) -> bool {
        self.payload.is_none()
    }

    /// Serialize to the JSON event text.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Decode one datagram with the standard registry.
pub fn decode(buf: &[u8]) -> Result<TelemetryRecord> {
    MessageRegistry::global().decode(buf)
}

/// Decode one datagram, logging and discarding anything malformed.
pub fn try_decode(buf: &[u8]) -> Option<TelemetryRecord> {
    match decode(buf) {
        Ok(record) => Some(record),
        Err(err) => {
            debug!(len = buf.len(), %err, "dropping undecodable datagram");
            None
        }
    }
}
