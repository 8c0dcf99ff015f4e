use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const CONTENT_TYPE_TEXT: &str = "text";
const CONTENT_TYPE_TOOL_USE: &str = "tool_use";

/// Kind of a JSONL record.
///
/// Known record types get their own variant; anything else is kept verbatim in [`EntryType::Other`]
/// so that unfamiliar records still count as entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryType {
    User,
    Assistant,
    System,
    ToolResult,
    QueueOperation,
    Summary,
    FileHistorySnapshot,
    Other(String),
}

impl EntryType {
    pub fn as_str(&self) -> &str {
        match self {
            EntryType::User => "user",
            EntryType::Assistant => "assistant",
            EntryType::System => "system",
            EntryType::ToolResult => "tool_result",
            EntryType::QueueOperation => "queue-operation",
            EntryType::Summary => "summary",
            EntryType::FileHistorySnapshot => "file-history-snapshot",
            EntryType::Other(name) => name,
        }
    }

    /// Parse a user-supplied type name (case-insensitive).
    pub fn parse(name: &str) -> Self {
        EntryType::from(name.trim().to_lowercase())
    }
}

impl From<String> for EntryType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "user" => EntryType::User,
            "assistant" => EntryType::Assistant,
            "system" => EntryType::System,
            "tool_result" => EntryType::ToolResult,
            "queue-operation" => EntryType::QueueOperation,
            "summary" => EntryType::Summary,
            "file-history-snapshot" => EntryType::FileHistorySnapshot,
            _ => EntryType::Other(value),
        }
    }
}

impl From<EntryType> for String {
    fn from(value: EntryType) -> Self {
        match value {
            EntryType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One block of a structured message payload (text, tool_use, tool_result, thinking, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(rename = "type", default)]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// A tool invocation embedded in an entry's message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    pub input: Value,
}

impl ToolUse {
    /// Compact JSON rendering of the input, the form tool-input patterns are matched against.
    pub fn serialized_input(&self) -> String {
        self.input.to_string()
    }
}

/// One JSONL record from a session or agent file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEntry {
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_null_default")]
    pub uuid: String,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_null_default")]
    pub session_id: String,
    #[serde(
        default,
        skip_serializing_if = "String::is_empty",
        deserialize_with = "crate::parsers::deserializers::deserialize_null_default"
    )]
    pub agent_id: String,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_null_default")]
    pub is_sidechain: bool,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<String>,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_timestamp")]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
}

impl ConversationEntry {
    /// Parsed timestamp, or `None` when the record carries no valid RFC 3339 instant.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp).ok().map(|ts| ts.with_timezone(&Utc))
    }

    pub fn is_user(&self) -> bool {
        self.entry_type == EntryType::User
    }

    pub fn is_assistant(&self) -> bool {
        self.entry_type == EntryType::Assistant
    }

    /// True for user and assistant records, the ones that make up an actual conversation.
    pub fn is_conversation(&self) -> bool {
        self.is_user() || self.is_assistant()
    }

    /// Content blocks of the message payload.
    ///
    /// Accepts a `{role, content}` envelope or a bare payload; content may be a plain string,
    /// an array of blocks, or a single block object. Blocks that don't decode are dropped.
    pub fn content_blocks(&self) -> Vec<MessageContent> {
        let Some(message) = &self.message else {
            return Vec::new();
        };

        let content = match message.get("content") {
            Some(inner) if !inner.is_null() => inner,
            _ => message,
        };

        match content {
            Value::String(text) => vec![MessageContent {
                content_type: CONTENT_TYPE_TEXT.to_string(),
                text: Some(text.clone()),
                ..MessageContent::default()
            }],
            Value::Array(items) => items
                .iter()
                .filter_map(|item| serde_json::from_value::<MessageContent>(item.clone()).ok())
                .collect(),
            Value::Object(_) => {
                serde_json::from_value::<MessageContent>(content.clone()).into_iter().collect()
            }
            _ => Vec::new(),
        }
    }

    /// Plain text of the message, text blocks joined by newlines.
    pub fn text_content(&self) -> String {
        let parts: Vec<String> = self
            .content_blocks()
            .into_iter()
            .filter(|c| c.content_type == CONTENT_TYPE_TEXT || c.content_type.is_empty())
            .filter_map(|c| c.text)
            .filter(|t| !t.is_empty())
            .collect();
        parts.join("\n")
    }

    /// Tool invocations embedded in the message, in payload order.
    pub fn tool_uses(&self) -> Vec<ToolUse> {
        self.content_blocks()
            .into_iter()
            .filter(|c| c.content_type == CONTENT_TYPE_TOOL_USE)
            .map(|c| ToolUse {
                id: c.id.unwrap_or_default(),
                name: c.name.unwrap_or_default(),
                input: c.input.unwrap_or(Value::Null),
            })
            .collect()
    }

    /// Case-insensitive check for a tool invocation with the given name.
    pub fn has_tool_call(&self, tool_name: &str) -> bool {
        let wanted = tool_name.to_lowercase();
        self.tool_uses().iter().any(|tool| tool.name.to_lowercase() == wanted)
    }
}
