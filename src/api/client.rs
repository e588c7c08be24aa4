//! Assistant backend API client
//!
//! Thin HTTP wrapper around the backend REST API. A single shared
//! `reqwest::Client` (connection pooling) with a fixed timeout carries all
//! calls; every request attaches the persisted bearer token when one exists,
//! and every non-2xx response is inspected before it is returned. A 401
//! clears the stored token and fires the registered unauthorized handler —
//! the login boundary itself is an external collaborator.

use crate::api::token::TokenStore;
use crate::api::types::{
    AddMcpServerRequest, Agent, CreateAgentRequest, McpServer, Message, SendMessageRequest, Tool,
    UpdateAgentRequest, User,
};
use crate::config::Config;
use crate::error::ApiError;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Default page size for message history requests
const DEFAULT_MESSAGE_LIMIT: u32 = 50;

/// Callback invoked when the backend rejects a request with 401
///
/// Fires at most once per response, after the stored token has been cleared.
pub type UnauthorizedHandler = Arc<dyn Fn() + Send + Sync>;

/// HTTP client for the assistant backend
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenStore>,
    on_unauthorized: Option<UnauthorizedHandler>,
}

impl ApiClient {
    /// Create a client from configuration and a token store
    ///
    /// # Errors
    /// Returns `ApiError::Network` if the underlying HTTP client cannot be
    /// constructed (e.g. TLS backend initialization failure).
    pub fn new(config: &Config, tokens: Arc<TokenStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tokens,
            on_unauthorized: None,
        })
    }

    /// Register the handler fired when a request comes back 401
    pub fn with_unauthorized_handler(mut self, handler: UnauthorizedHandler) -> Self {
        self.on_unauthorized = Some(handler);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request, attaching auth, and fail on non-2xx statuses
    async fn execute(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let builder = match self.tokens.load() {
            Ok(Some(token)) => builder.bearer_auth(token),
            Ok(None) => builder,
            Err(err) => {
                tracing::warn!(%err, "Failed to read stored token, sending request unauthenticated");
                builder
            }
        };

        let response = builder.send().await.map_err(ApiError::from)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());

        tracing::error!(
            status_code = status.as_u16(),
            error_body = %body,
            "Backend returned error status"
        );

        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
        }

        Err(ApiError::Http {
            status: status.as_u16(),
            body,
        })
    }

    /// Send a request and deserialize the JSON response body
    async fn request<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.execute(builder).await?;
        response.json::<T>().await.map_err(ApiError::from)
    }

    fn handle_unauthorized(&self) {
        match self.tokens.clear() {
            Ok(()) => tracing::info!("Cleared stored token after 401"),
            Err(err) => tracing::warn!(%err, "Failed to clear stored token after 401"),
        }
        if let Some(handler) = &self.on_unauthorized {
            handler();
        }
    }

    /// Fetch all agents
    pub async fn list_agents(&self) -> Result<Vec<Agent>, ApiError> {
        tracing::debug!("Fetching agent list");
        self.request(self.http.get(self.url("/v1/agents"))).await
    }

    /// Create a new agent
    pub async fn create_agent(&self, req: &CreateAgentRequest) -> Result<Agent, ApiError> {
        self.request(self.http.post(self.url("/v1/agents")).json(req))
            .await
    }

    /// Fetch a single agent by ID
    pub async fn get_agent(&self, agent_id: &str) -> Result<Agent, ApiError> {
        self.request(self.http.get(self.url(&format!("/v1/agents/{}", agent_id))))
            .await
    }

    /// Apply a partial update to an agent
    pub async fn update_agent(
        &self,
        agent_id: &str,
        req: &UpdateAgentRequest,
    ) -> Result<Agent, ApiError> {
        self.request(
            self.http
                .put(self.url(&format!("/v1/agents/{}", agent_id)))
                .json(req),
        )
        .await
    }

    /// Delete an agent
    pub async fn delete_agent(&self, agent_id: &str) -> Result<(), ApiError> {
        self.execute(self.http.delete(self.url(&format!("/v1/agents/{}", agent_id))))
            .await?;
        Ok(())
    }

    /// Send a message to an agent and receive the assistant's reply
    pub async fn send_message(&self, agent_id: &str, message: &str) -> Result<Message, ApiError> {
        tracing::debug!(
            agent_id = %agent_id,
            message_len = message.len(),
            "Sending message to agent"
        );
        let req = SendMessageRequest {
            message: message.to_string(),
        };
        self.request(
            self.http
                .post(self.url(&format!("/v1/agents/{}/messages", agent_id)))
                .json(&req),
        )
        .await
    }

    /// Fetch an agent's message history (most recent `limit`, default 50)
    pub async fn get_messages(
        &self,
        agent_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Message>, ApiError> {
        let limit = limit.unwrap_or(DEFAULT_MESSAGE_LIMIT);
        self.request(
            self.http
                .get(self.url(&format!("/v1/agents/{}/messages", agent_id)))
                .query(&[("limit", limit)]),
        )
        .await
    }

    /// Fetch all tools known to the backend
    pub async fn list_tools(&self) -> Result<Vec<Tool>, ApiError> {
        self.request(self.http.get(self.url("/v1/tools"))).await
    }

    /// Fetch the tools exposed by a named MCP server
    pub async fn get_mcp_tools(&self, server_name: &str) -> Result<Vec<Tool>, ApiError> {
        self.request(self.http.get(self.url(&format!(
            "/v1/tools/mcp/servers/{}/tools",
            server_name
        ))))
        .await
    }

    /// Register an MCP server with the backend
    pub async fn add_mcp_server(&self, req: &AddMcpServerRequest) -> Result<McpServer, ApiError> {
        self.request(self.http.post(self.url("/v1/tools/mcp/servers")).json(req))
            .await
    }

    /// Fetch the currently authenticated user
    pub async fn get_current_user(&self) -> Result<User, ApiError> {
        self.request(self.http.get(self.url("/v1/users/me"))).await
    }
}
