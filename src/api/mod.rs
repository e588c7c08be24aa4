//! Backend API layer
//!
//! Wire types, the REST client, and bearer token persistence.

pub mod client;
pub mod token;
pub mod types;

pub use client::{ApiClient, UnauthorizedHandler};
pub use token::TokenStore;
pub use types::{
    AddMcpServerRequest, Agent, CreateAgentRequest, DeliveryStatus, McpServer, Message,
    MessageRole, SendMessageRequest, Tool, UpdateAgentRequest, User,
};
