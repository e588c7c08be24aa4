//! Wire types for the assistant backend API
//!
//! Defines structures for agents, conversation messages, tools, and users.
//! Unknown backend fields are ignored on deserialization so the client stays
//! compatible with richer server payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named conversational agent managed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique identifier assigned by the backend
    pub id: String,
    /// Display name of the agent
    pub name: String,
}

impl Agent {
    /// Create an agent value with the given ID and name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user
    User,
    /// Message from the assistant
    Assistant,
}

impl MessageRole {
    /// Convert the role to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// Delivery state of a message, tracked locally only
///
/// Makes the optimistic-update path explicit: a user message is appended as
/// `Pending` before the backend call and marked `Sent` or `Failed` in place
/// when the call completes. There is no rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryStatus {
    /// Appended optimistically, backend call still in flight
    Pending,
    /// Acknowledged by the backend (or received from it)
    #[default]
    Sent,
    /// The backend call failed; the message stays in the transcript
    Failed,
}

/// One turn in a conversation, tagged user or assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier (backend-assigned, or a local v4 UUID)
    pub id: String,
    /// Role of the sender
    pub role: MessageRole,
    /// Text content of the message
    pub content: String,
    /// When the message was created
    pub timestamp: DateTime<Utc>,
    /// Local delivery state; never sent over the wire
    #[serde(skip)]
    pub delivery: DeliveryStatus,
}

impl Message {
    /// Create a locally authored user message, pending delivery
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            delivery: DeliveryStatus::Pending,
        }
    }

    /// Create an assistant message (simulated or already delivered)
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            delivery: DeliveryStatus::Sent,
        }
    }
}

/// A tool available to agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name
    pub name: String,
    /// Human-readable description, when the backend provides one
    #[serde(default)]
    pub description: Option<String>,
}

/// The authenticated user, as reported by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
}

/// Request body for creating an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAgentRequest {
    /// Display name for the new agent
    pub name: String,
}

/// Request body for a partial agent update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAgentRequest {
    /// New display name, if it should change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Request body for sending a message to an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// The user's message text
    pub message: String,
}

/// Request body for registering an MCP server with the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMcpServerRequest {
    /// Name the server will be addressed by
    pub server_name: String,
    /// Command used to launch the server
    pub command: String,
    /// Arguments passed to the command
    #[serde(default)]
    pub args: Vec<String>,
}

/// A registered MCP server, as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServer {
    /// Name the server is addressed by
    pub server_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&MessageRole::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(MessageRole::User.as_str(), "user");
    }

    #[test]
    fn test_user_message_is_pending() {
        let msg = Message::user("hello");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.delivery, DeliveryStatus::Pending);
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn test_assistant_message_is_sent() {
        let msg = Message::assistant("hi there");
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.delivery, DeliveryStatus::Sent);
    }

    #[test]
    fn test_message_deserializes_without_delivery() {
        let json = r#"{
            "id": "msg-1",
            "role": "assistant",
            "content": "hello",
            "timestamp": "2024-01-01T00:00:00Z"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.role, MessageRole::Assistant);
        // Wire messages default to delivered
        assert_eq!(msg.delivery, DeliveryStatus::Sent);
    }

    #[test]
    fn test_agent_ignores_unknown_fields() {
        let json = r#"{"id": "a-1", "name": "Jarvis", "model": "gpt-4"}"#;
        let agent: Agent = serde_json::from_str(json).unwrap();
        assert_eq!(agent.id, "a-1");
        assert_eq!(agent.name, "Jarvis");
    }

    #[test]
    fn test_update_request_skips_absent_fields() {
        let req = UpdateAgentRequest { name: None };
        assert_eq!(serde_json::to_string(&req).unwrap(), "{}");
    }
}
