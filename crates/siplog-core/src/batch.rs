//! Batch domain model
//!
//! Field names on the wire follow the log collector's JSON format. Every
//! field is optional on input and falls back to its zero value, so a
//! structurally valid object always decodes.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Entry type tag that marks raw SIP signaling text.
pub const SIP_ENTRY_TYPE: &str = "sip";

/// A call participant snapshot, carried for context only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantInfo {
    pub alias: String,
    pub host: String,
    pub name: String,
    pub participant_id: String,
    pub product_name: String,
    pub sip_node: String,
}

/// Batch-level correlation data, copied verbatim from request to response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchMetaInfo {
    pub session_list: Vec<String>,
    pub h323_conf_id: String,
    pub participant_list: Vec<ParticipantInfo>,
    pub node_list: Vec<String>,
    pub call_id: String,
    pub cld_list: Vec<String>,
    pub cli_list: Vec<String>,
    pub i_account: Vec<String>,
    pub i_customer: Vec<String>,
    pub parent_billing_session_id: String,
}

/// Per-entry metadata, copied verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryMetaInfo {
    pub datetime: String,
    pub diagramtext: String,
    pub dialog_id: String,
    pub level: i64,
    pub message_class: String,
    pub operation: String,
    pub participant_from: String,
    pub participant_from_id: String,
    pub participant_to: String,
    pub participant_to_id: String,
    pub sip_node: String,
}

/// A single signaling-log record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEntry {
    pub meta_info: EntryMetaInfo,
    /// Raw signaling payload. Only the redaction capability looks inside it.
    pub text: String,
    #[serde(rename = "type")]
    pub entry_type: String,
}

impl LogEntry {
    pub fn new(entry_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            meta_info: EntryMetaInfo::default(),
            text: text.into(),
            entry_type: entry_type.into(),
        }
    }

    pub fn with_meta_info(mut self, meta_info: EntryMetaInfo) -> Self {
        self.meta_info = meta_info;
        self
    }

    /// Exact, case-sensitive match on the `sip` tag.
    pub fn is_redaction_candidate(&self) -> bool {
        self.entry_type == SIP_ENTRY_TYPE
    }
}

/// One request's full set of log entries plus shared metadata.
///
/// The same shape is used for the request and the response: the response
/// keeps entry count and order, and reproduces `meta` unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Batch {
    #[serde(rename = "log_message_list")]
    pub entries: Vec<LogEntry>,
    #[serde(rename = "meta_info")]
    pub meta: BatchMetaInfo,
}

impl Batch {
    pub fn new(entries: Vec<LogEntry>, meta: BatchMetaInfo) -> Self {
        Self { entries, meta }
    }

    /// Decode a batch from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let encoded = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        encoded.map_err(|e| Error::Internal(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that will go through redaction
    pub fn candidate_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.is_redaction_candidate())
            .count()
    }
}
