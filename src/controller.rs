//! Chat flow controller
//!
//! Owns the store and drives the conversation state machine: Idle (no agent
//! selected) → Ready (agent selected, empty transcript) → Waiting (send in
//! flight) → Ready. All store mutation happens on the UI thread; background
//! work runs on the tokio runtime and reports back through a completion-event
//! channel that the UI drains once per frame via `poll_events`.
//!
//! Every selection change bumps a conversation epoch. Completion events carry
//! the epoch they were issued under and are discarded if the selection has
//! moved on, so a late reply can never land in another agent's transcript.

use crate::api::types::{
    AddMcpServerRequest, Agent, CreateAgentRequest, DeliveryStatus, McpServer, Message, Tool, User,
};
use crate::api::ApiClient;
use crate::backend::MessageBackend;
use crate::error::{ApiError, StoreError};
use crate::state::{Action, AppState, Store};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Completion events delivered from background tasks to the UI thread
#[derive(Debug)]
pub enum ChatEvent {
    /// The agent list fetch finished
    AgentsLoaded(Result<Vec<Agent>, ApiError>),
    /// A message send finished
    ReplyReceived {
        /// Conversation epoch the send was issued under
        epoch: u64,
        /// ID of the optimistically appended user message
        user_message_id: String,
        /// The assistant's reply, or the failure
        result: Result<Message, ApiError>,
    },
    /// A history fetch for the selected agent finished
    HistoryLoaded {
        /// Conversation epoch the fetch was issued under
        epoch: u64,
        /// The fetched transcript, or the failure
        result: Result<Vec<Message>, ApiError>,
    },
    /// An agent creation finished
    AgentCreated(Result<Agent, ApiError>),
    /// An agent deletion finished
    AgentDeleted {
        /// ID of the agent the deletion targeted
        id: String,
        /// Outcome of the deletion
        result: Result<(), ApiError>,
    },
    /// The tool list fetch finished
    ToolsLoaded(Result<Vec<Tool>, ApiError>),
    /// A per-server MCP tool fetch finished
    McpToolsLoaded {
        /// Name of the MCP server that was queried
        server: String,
        /// The server's tools, or the failure
        result: Result<Vec<Tool>, ApiError>,
    },
    /// An MCP server registration finished
    McpServerAdded(Result<McpServer, ApiError>),
    /// The current-user fetch finished
    UserLoaded(Result<User, ApiError>),
}

/// Fixed fallback shown when the agent list cannot be fetched
///
/// Keeps the UI usable against a dead backend; the fetch error is still
/// surfaced for display.
pub fn fallback_agents() -> Vec<Agent> {
    vec![
        Agent::new("1", "Jarvis Assistant"),
        Agent::new("2", "Data Analyst"),
        Agent::new("3", "Document Organizer"),
    ]
}

/// Drives the chat flow over a store, an API client, and a message backend
pub struct ChatController {
    store: Store,
    api: Arc<ApiClient>,
    backend: Arc<dyn MessageBackend>,
    runtime: tokio::runtime::Handle,
    tx: UnboundedSender<ChatEvent>,
    rx: UnboundedReceiver<ChatEvent>,
    epoch: u64,
    tools: Vec<Tool>,
    mcp_tools: Vec<Tool>,
    mcp_server: Option<String>,
    current_user: Option<User>,
}

impl ChatController {
    /// Create a controller with a freshly initialized store
    pub fn new(
        api: Arc<ApiClient>,
        backend: Arc<dyn MessageBackend>,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            store: Store::new(),
            api,
            backend,
            runtime,
            tx,
            rx,
            epoch: 0,
            tools: Vec::new(),
            mcp_tools: Vec::new(),
            mcp_server: None,
            current_user: None,
        }
    }

    /// Read the current application state
    pub fn state(&self) -> Result<&AppState, StoreError> {
        self.store.state()
    }

    /// Tools most recently fetched from the backend
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Tools of the most recently queried MCP server
    pub fn mcp_tools(&self) -> &[Tool] {
        &self.mcp_tools
    }

    /// Name of the most recently queried MCP server
    pub fn mcp_server(&self) -> Option<&str> {
        self.mcp_server.as_deref()
    }

    /// The authenticated user, once fetched
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// Fetch the agent list; called once on startup and on manual refresh
    pub fn load_agents(&mut self) -> Result<(), StoreError> {
        self.store.dispatch(Action::SetLoading(true))?;
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.list_agents().await;
            let _ = tx.send(ChatEvent::AgentsLoaded(result));
        });
        Ok(())
    }

    /// Select an agent (or clear the selection), starting a new conversation
    ///
    /// Bumps the conversation epoch so in-flight replies for the previous
    /// selection are discarded, and resets the loading flag: the new
    /// conversation starts Ready.
    pub fn select_agent(&mut self, agent: Option<Agent>) -> Result<(), StoreError> {
        self.epoch += 1;
        self.store.dispatch(Action::SetSelectedAgent(agent))?;
        self.store.dispatch(Action::SetLoading(false))
    }

    /// Send a message to the selected agent
    ///
    /// Guards: empty or whitespace-only text, no selection, or a send already
    /// in flight all make this a no-op, not an error. The user message is
    /// appended optimistically as `Pending` and is marked `Sent` or `Failed`
    /// in place when the backend call completes; there is no rollback.
    pub fn send_message(&mut self, text: &str) -> Result<(), StoreError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        let state = self.store.state()?;
        if state.loading {
            return Ok(());
        }
        let Some(agent) = state.selected_agent.clone() else {
            return Ok(());
        };

        let user_message = Message::user(trimmed);
        let user_message_id = user_message.id.clone();
        self.store.dispatch(Action::AddMessage(user_message))?;
        self.store.dispatch(Action::SetLoading(true))?;

        let backend = self.backend.clone();
        let tx = self.tx.clone();
        let epoch = self.epoch;
        let text = trimmed.to_string();
        self.runtime.spawn(async move {
            let result = backend.send(&agent, &text).await;
            let _ = tx.send(ChatEvent::ReplyReceived {
                epoch,
                user_message_id,
                result,
            });
        });
        Ok(())
    }

    /// Fetch the selected agent's stored history, replacing the transcript
    pub fn load_history(&mut self) -> Result<(), StoreError> {
        let Some(agent) = self.store.state()?.selected_agent.clone() else {
            return Ok(());
        };
        let api = self.api.clone();
        let tx = self.tx.clone();
        let epoch = self.epoch;
        self.runtime.spawn(async move {
            let result = api.get_messages(&agent.id, None).await;
            let _ = tx.send(ChatEvent::HistoryLoaded { epoch, result });
        });
        Ok(())
    }

    /// Create a new agent with the given name
    pub fn create_agent(&mut self, name: String) -> Result<(), StoreError> {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.create_agent(&CreateAgentRequest { name }).await;
            let _ = tx.send(ChatEvent::AgentCreated(result));
        });
        Ok(())
    }

    /// Delete an agent by ID
    pub fn delete_agent(&mut self, id: String) -> Result<(), StoreError> {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.delete_agent(&id).await;
            let _ = tx.send(ChatEvent::AgentDeleted { id, result });
        });
        Ok(())
    }

    /// Fetch the backend's tool list
    pub fn load_tools(&mut self) -> Result<(), StoreError> {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.list_tools().await;
            let _ = tx.send(ChatEvent::ToolsLoaded(result));
        });
        Ok(())
    }

    /// Fetch the tools of a named MCP server
    pub fn load_mcp_tools(&mut self, server: String) -> Result<(), StoreError> {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.get_mcp_tools(&server).await;
            let _ = tx.send(ChatEvent::McpToolsLoaded { server, result });
        });
        Ok(())
    }

    /// Register an MCP server with the backend
    pub fn add_mcp_server(&mut self, req: AddMcpServerRequest) -> Result<(), StoreError> {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.add_mcp_server(&req).await;
            let _ = tx.send(ChatEvent::McpServerAdded(result));
        });
        Ok(())
    }

    /// Fetch the authenticated user for display in the header
    pub fn load_current_user(&mut self) -> Result<(), StoreError> {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.get_current_user().await;
            let _ = tx.send(ChatEvent::UserLoaded(result));
        });
        Ok(())
    }

    /// Clear the user-visible error
    pub fn clear_error(&mut self) -> Result<(), StoreError> {
        self.store.dispatch(Action::SetError(None))
    }

    /// Drain and apply all pending completion events; called once per frame
    pub fn poll_events(&mut self) -> Result<(), StoreError> {
        while let Ok(event) = self.rx.try_recv() {
            self.apply_event(event)?;
        }
        Ok(())
    }

    /// Wait for the next completion event without applying it
    ///
    /// Used by headless drivers and tests; the UI path goes through
    /// `poll_events`.
    pub async fn next_event(&mut self) -> Option<ChatEvent> {
        self.rx.recv().await
    }

    /// Apply a single completion event to the store
    pub fn apply_event(&mut self, event: ChatEvent) -> Result<(), StoreError> {
        match event {
            ChatEvent::AgentsLoaded(Ok(agents)) => {
                self.store.dispatch(Action::SetAgents(agents))?;
                self.store.dispatch(Action::SetLoading(false))
            }
            ChatEvent::AgentsLoaded(Err(err)) => {
                tracing::error!(%err, "Failed to fetch agent list, falling back to sample agents");
                self.store
                    .dispatch(Action::SetError(Some(format!("Failed to load agents: {}", err))))?;
                self.store.dispatch(Action::SetAgents(fallback_agents()))?;
                self.store.dispatch(Action::SetLoading(false))
            }
            ChatEvent::ReplyReceived {
                epoch,
                user_message_id,
                result,
            } => {
                if epoch != self.epoch {
                    tracing::debug!(
                        reply_epoch = epoch,
                        current_epoch = self.epoch,
                        "Discarding reply for an abandoned conversation"
                    );
                    return Ok(());
                }
                match result {
                    Ok(reply) => {
                        self.store.dispatch(Action::SetMessageDelivery {
                            id: user_message_id,
                            delivery: DeliveryStatus::Sent,
                        })?;
                        self.store.dispatch(Action::AddMessage(reply))?;
                    }
                    Err(err) => {
                        tracing::error!(%err, "Failed to send message");
                        self.store.dispatch(Action::SetMessageDelivery {
                            id: user_message_id,
                            delivery: DeliveryStatus::Failed,
                        })?;
                        self.store.dispatch(Action::SetError(Some(format!(
                            "Failed to send message: {}",
                            err
                        ))))?;
                    }
                }
                self.store.dispatch(Action::SetLoading(false))
            }
            ChatEvent::HistoryLoaded { epoch, result } => {
                if epoch != self.epoch {
                    tracing::debug!("Discarding history for an abandoned conversation");
                    return Ok(());
                }
                match result {
                    Ok(messages) => self.store.dispatch(Action::SetMessages(messages)),
                    Err(err) => self
                        .store
                        .dispatch(Action::SetError(Some(format!("Failed to load history: {}", err)))),
                }
            }
            ChatEvent::AgentCreated(Ok(agent)) => {
                let mut agents = self.store.state()?.agents.clone();
                agents.push(agent);
                self.store.dispatch(Action::SetAgents(agents))
            }
            ChatEvent::AgentCreated(Err(err)) => self
                .store
                .dispatch(Action::SetError(Some(format!("Failed to create agent: {}", err)))),
            ChatEvent::AgentDeleted { id, result } => match result {
                Ok(()) => {
                    let mut agents = self.store.state()?.agents.clone();
                    agents.retain(|a| a.id != id);
                    self.store.dispatch(Action::SetAgents(agents))?;
                    let selected = self
                        .store
                        .state()?
                        .selected_agent
                        .as_ref()
                        .is_some_and(|a| a.id == id);
                    if selected {
                        self.select_agent(None)?;
                    }
                    Ok(())
                }
                Err(err) => self
                    .store
                    .dispatch(Action::SetError(Some(format!("Failed to delete agent: {}", err)))),
            },
            ChatEvent::ToolsLoaded(Ok(tools)) => {
                self.tools = tools;
                Ok(())
            }
            ChatEvent::ToolsLoaded(Err(err)) => self
                .store
                .dispatch(Action::SetError(Some(format!("Failed to load tools: {}", err)))),
            ChatEvent::McpToolsLoaded { server, result } => match result {
                Ok(tools) => {
                    self.mcp_server = Some(server);
                    self.mcp_tools = tools;
                    Ok(())
                }
                Err(err) => self.store.dispatch(Action::SetError(Some(format!(
                    "Failed to load tools from MCP server '{}': {}",
                    server, err
                )))),
            },
            ChatEvent::McpServerAdded(Ok(server)) => {
                tracing::info!(server_name = %server.server_name, "Registered MCP server");
                Ok(())
            }
            ChatEvent::McpServerAdded(Err(err)) => self
                .store
                .dispatch(Action::SetError(Some(format!("Failed to add MCP server: {}", err)))),
            ChatEvent::UserLoaded(Ok(user)) => {
                self.current_user = Some(user);
                Ok(())
            }
            ChatEvent::UserLoaded(Err(err)) => {
                // Not fatal and not worth an error banner; the header just
                // stays anonymous.
                tracing::warn!(%err, "Failed to fetch current user");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::MessageRole;
    use crate::api::TokenStore;
    use crate::backend::SimulatedBackend;
    use crate::config::Config;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn unreachable_api(dir: &TempDir) -> Arc<ApiClient> {
        // Nothing listens on port 1, so every call fails fast
        let config = Config {
            api_base_url: "http://127.0.0.1:1/api".to_string(),
            request_timeout_secs: 10,
            data_dir: PathBuf::from(dir.path()),
            simulate: false,
        };
        let tokens = Arc::new(TokenStore::new(config.token_path()));
        Arc::new(ApiClient::new(&config, tokens).unwrap())
    }

    fn controller(dir: &TempDir) -> ChatController {
        ChatController::new(
            unreachable_api(dir),
            Arc::new(SimulatedBackend::instant()),
            tokio::runtime::Handle::current(),
        )
    }

    #[tokio::test]
    async fn test_send_message_full_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut ctl = controller(&dir);
        ctl.select_agent(Some(Agent::new("7", "X"))).unwrap();

        ctl.send_message("hello").unwrap();

        // The user message is appended synchronously, pending delivery
        {
            let state = ctl.state().unwrap();
            assert_eq!(state.messages.len(), 1);
            assert_eq!(state.messages[0].role, MessageRole::User);
            assert_eq!(state.messages[0].content, "hello");
            assert_eq!(state.messages[0].delivery, DeliveryStatus::Pending);
            assert!(state.loading);
        }

        let event = ctl.next_event().await.unwrap();
        ctl.apply_event(event).unwrap();

        let state = ctl.state().unwrap();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].delivery, DeliveryStatus::Sent);
        assert_eq!(state.messages[1].role, MessageRole::Assistant);
        assert!(state.messages[1].content.contains("X"));
        assert!(state.messages[1].content.contains("hello"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_send_message_trims_input() {
        let dir = TempDir::new().unwrap();
        let mut ctl = controller(&dir);
        ctl.select_agent(Some(Agent::new("1", "A"))).unwrap();

        ctl.send_message("  hi  ").unwrap();
        assert_eq!(ctl.state().unwrap().messages[0].content, "hi");
    }

    #[tokio::test]
    async fn test_empty_and_whitespace_sends_are_noops() {
        let dir = TempDir::new().unwrap();
        let mut ctl = controller(&dir);
        ctl.select_agent(Some(Agent::new("1", "A"))).unwrap();

        ctl.send_message("").unwrap();
        ctl.send_message("   ").unwrap();

        let state = ctl.state().unwrap();
        assert!(state.messages.is_empty());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_send_without_selection_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut ctl = controller(&dir);

        ctl.send_message("hello").unwrap();

        let state = ctl.state().unwrap();
        assert!(state.messages.is_empty());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_send_while_loading_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut ctl = controller(&dir);
        ctl.select_agent(Some(Agent::new("1", "A"))).unwrap();

        ctl.send_message("first").unwrap();
        assert!(ctl.state().unwrap().loading);

        // Second send while the first is in flight must not mutate state
        ctl.send_message("second").unwrap();
        assert_eq!(ctl.state().unwrap().messages.len(), 1);

        let event = ctl.next_event().await.unwrap();
        ctl.apply_event(event).unwrap();
        // Only the first exchange landed
        assert_eq!(ctl.state().unwrap().messages.len(), 2);
    }

    #[tokio::test]
    async fn test_stale_reply_is_discarded_after_agent_switch() {
        let dir = TempDir::new().unwrap();
        let mut ctl = controller(&dir);
        ctl.select_agent(Some(Agent::new("1", "A"))).unwrap();
        ctl.send_message("hello").unwrap();

        // Switch agents while the reply is in flight
        ctl.select_agent(Some(Agent::new("2", "B"))).unwrap();
        assert!(ctl.state().unwrap().messages.is_empty());
        assert!(!ctl.state().unwrap().loading);

        let event = ctl.next_event().await.unwrap();
        ctl.apply_event(event).unwrap();

        // The late reply must not land in B's conversation
        let state = ctl.state().unwrap();
        assert!(state.messages.is_empty());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_agent_fetch_failure_installs_fallback() {
        let dir = TempDir::new().unwrap();
        let mut ctl = controller(&dir);

        ctl.load_agents().unwrap();
        assert!(ctl.state().unwrap().loading);

        let event = ctl.next_event().await.unwrap();
        ctl.apply_event(event).unwrap();

        let state = ctl.state().unwrap();
        assert_eq!(state.agents.len(), 3);
        let ids: Vec<_> = state.agents.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert!(state.error.is_some());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_agents_loaded_success_replaces_list() {
        let dir = TempDir::new().unwrap();
        let mut ctl = controller(&dir);

        ctl.apply_event(ChatEvent::AgentsLoaded(Ok(vec![Agent::new("9", "Real")])))
            .unwrap();

        let state = ctl.state().unwrap();
        assert_eq!(state.agents.len(), 1);
        assert_eq!(state.agents[0].name, "Real");
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_send_marks_message_failed_in_place() {
        let dir = TempDir::new().unwrap();
        let mut ctl = controller(&dir);
        ctl.select_agent(Some(Agent::new("1", "A"))).unwrap();
        ctl.send_message("hello").unwrap();

        let user_id = ctl.state().unwrap().messages[0].id.clone();
        // Drop the real (successful) simulated reply and apply a failure
        let _ = ctl.next_event().await.unwrap();
        ctl.apply_event(ChatEvent::ReplyReceived {
            epoch: 1,
            user_message_id: user_id,
            result: Err(ApiError::Timeout),
        })
        .unwrap();

        let state = ctl.state().unwrap();
        // The optimistic user message stays, tagged failed; no rollback
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].delivery, DeliveryStatus::Failed);
        assert!(state.error.as_deref().unwrap().contains("Failed to send message"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_agent_created_appends_to_list() {
        let dir = TempDir::new().unwrap();
        let mut ctl = controller(&dir);
        ctl.apply_event(ChatEvent::AgentsLoaded(Ok(vec![Agent::new("1", "A")])))
            .unwrap();

        ctl.apply_event(ChatEvent::AgentCreated(Ok(Agent::new("2", "B"))))
            .unwrap();

        let state = ctl.state().unwrap();
        assert_eq!(state.agents.len(), 2);
        assert_eq!(state.agents[1].name, "B");
    }

    #[tokio::test]
    async fn test_deleting_selected_agent_clears_selection() {
        let dir = TempDir::new().unwrap();
        let mut ctl = controller(&dir);
        ctl.apply_event(ChatEvent::AgentsLoaded(Ok(vec![
            Agent::new("1", "A"),
            Agent::new("2", "B"),
        ])))
        .unwrap();
        ctl.select_agent(Some(Agent::new("1", "A"))).unwrap();

        ctl.apply_event(ChatEvent::AgentDeleted {
            id: "1".to_string(),
            result: Ok(()),
        })
        .unwrap();

        let state = ctl.state().unwrap();
        assert_eq!(state.agents.len(), 1);
        assert!(state.selected_agent.is_none());
        assert!(state.messages.is_empty());
    }

    #[tokio::test]
    async fn test_stale_history_is_discarded() {
        let dir = TempDir::new().unwrap();
        let mut ctl = controller(&dir);
        ctl.select_agent(Some(Agent::new("1", "A"))).unwrap();
        let old_epoch = 1;
        ctl.select_agent(Some(Agent::new("2", "B"))).unwrap();

        ctl.apply_event(ChatEvent::HistoryLoaded {
            epoch: old_epoch,
            result: Ok(vec![Message::assistant("old transcript")]),
        })
        .unwrap();

        assert!(ctl.state().unwrap().messages.is_empty());
    }

    #[tokio::test]
    async fn test_tools_and_user_events_update_controller() {
        let dir = TempDir::new().unwrap();
        let mut ctl = controller(&dir);

        ctl.apply_event(ChatEvent::ToolsLoaded(Ok(vec![Tool {
            name: "web_search".to_string(),
            description: None,
        }])))
        .unwrap();
        assert_eq!(ctl.tools().len(), 1);

        ctl.apply_event(ChatEvent::McpToolsLoaded {
            server: "filesystem".to_string(),
            result: Ok(vec![Tool {
                name: "read_file".to_string(),
                description: Some("Read a file".to_string()),
            }]),
        })
        .unwrap();
        assert_eq!(ctl.mcp_server(), Some("filesystem"));
        assert_eq!(ctl.mcp_tools().len(), 1);

        ctl.apply_event(ChatEvent::UserLoaded(Ok(User {
            id: "u-1".to_string(),
            name: "Rohan".to_string(),
        })))
        .unwrap();
        assert_eq!(ctl.current_user().unwrap().name, "Rohan");
    }
}
