use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blocks::model::VersePair;

/// `type` field carried by every outbound lookup request
pub const LOOKUP_MESSAGE_TYPE: &str = "bible:lookup";

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("lookup channel closed")]
    Closed,
    #[error("failed to serialize outbound message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Outbound request, block → host. Exactly one per submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    #[serde(rename = "type")]
    pub message_type: String,
    pub id: String,
    pub query: String,
}

impl LookupRequest {
    pub fn new(id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            message_type: LOOKUP_MESSAGE_TYPE.to_string(),
            id: id.into(),
            query: query.into(),
        }
    }
}

/// Inbound result, host → all subscribers (broadcast)
///
/// An absent `result`, or one lacking both `text` and a non-empty `verses`,
/// signals lookup failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<LookupPayload>,
}

impl LookupResult {
    pub fn failure(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            result: None,
        }
    }
}

/// Payload of a completed lookup; every field is optional on the wire
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(rename = "bookName", skip_serializing_if = "Option::is_none")]
    pub book_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<RawText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verses: Option<Vec<VersePair>>,
}

impl LookupPayload {
    /// Non-empty canonical verses, when the host supplied them
    pub fn canonical_verses(&self) -> Option<&[VersePair]> {
        self.verses.as_deref().filter(|verses| !verses.is_empty())
    }

    /// True when the payload carries neither verses nor legacy text
    pub fn is_empty(&self) -> bool {
        self.canonical_verses().is_none() && self.text.is_none()
    }
}

/// Legacy `text` field shape: a single string or a sequence of lines
///
/// Normalized into lines exactly once, at the model boundary; nothing
/// downstream branches on the wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawText {
    Single(String),
    Lines(Vec<String>),
}

impl RawText {
    pub fn into_lines(self) -> Vec<String> {
        match self {
            RawText::Single(text) => text.lines().map(str::to_string).collect(),
            RawText::Lines(lines) => lines,
        }
    }
}

/// Transport half of the outbound channel, implemented by the host glue
///
/// Delivery reliability is the host's concern; a failed send leaves the
/// requesting block in `loading`.
pub trait OutboundSink {
    fn send(&mut self, request: &LookupRequest) -> Result<(), ChannelError>;
}
