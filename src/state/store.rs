//! Application state store
//!
//! Single source of truth for UI-relevant state. All mutation flows through
//! `Store::dispatch` with a fixed set of actions; there is no other mutation
//! path. Mutations are synchronous and total. The store must be initialized
//! before any read or dispatch; access outside an active instance fails with
//! `StoreError::Uninitialized`.

use crate::api::types::{Agent, DeliveryStatus, Message};
use crate::error::StoreError;

/// UI-relevant application state
///
/// Invariant: `messages` pertains only to `selected_agent`. Replacing the
/// selection clears the transcript in the same reducer step, so two agents'
/// histories can never interleave.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Agents available for conversation, in backend order
    pub agents: Vec<Agent>,
    /// The agent the user is currently talking to, if any
    pub selected_agent: Option<Agent>,
    /// Transcript of the current conversation, chronological
    pub messages: Vec<Message>,
    /// Whether a send (or initial fetch) is in flight
    pub loading: bool,
    /// User-visible error, if any
    pub error: Option<String>,
}

/// The fixed set of state mutations
#[derive(Debug, Clone)]
pub enum Action {
    /// Replace the agent list
    SetAgents(Vec<Agent>),
    /// Replace the selected agent and clear the transcript
    SetSelectedAgent(Option<Agent>),
    /// Replace the transcript
    SetMessages(Vec<Message>),
    /// Append a message, preserving order
    AddMessage(Message),
    /// Update a message's delivery tag in place
    SetMessageDelivery {
        /// ID of the message to update
        id: String,
        /// New delivery state
        delivery: DeliveryStatus,
    },
    /// Replace the loading flag
    SetLoading(bool),
    /// Replace (or clear) the user-visible error
    SetError(Option<String>),
}

fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::SetAgents(agents) => state.agents = agents,
        Action::SetSelectedAgent(agent) => {
            // The transcript belongs to the selection; switching drops it
            // atomically so a new conversation always starts empty.
            state.selected_agent = agent;
            state.messages.clear();
        }
        Action::SetMessages(messages) => state.messages = messages,
        Action::AddMessage(message) => state.messages.push(message),
        Action::SetMessageDelivery { id, delivery } => {
            if let Some(message) = state.messages.iter_mut().find(|m| m.id == id) {
                message.delivery = delivery;
            }
        }
        Action::SetLoading(loading) => state.loading = loading,
        Action::SetError(error) => state.error = error,
    }
}

/// Reducer-backed state container
#[derive(Debug)]
pub struct Store {
    state: Option<AppState>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an initialized store with default state
    pub fn new() -> Self {
        Self {
            state: Some(AppState::default()),
        }
    }

    /// Create a store handle that has not been initialized yet
    pub fn uninitialized() -> Self {
        Self { state: None }
    }

    /// Install the default state; a no-op if already initialized
    pub fn init(&mut self) {
        if self.state.is_none() {
            self.state = Some(AppState::default());
        }
    }

    /// Tear the store down; subsequent reads and dispatches fail
    pub fn shutdown(&mut self) {
        self.state = None;
    }

    /// Read the current state
    pub fn state(&self) -> Result<&AppState, StoreError> {
        self.state.as_ref().ok_or(StoreError::Uninitialized)
    }

    /// Apply an action to the state
    pub fn dispatch(&mut self, action: Action) -> Result<(), StoreError> {
        let state = self.state.as_mut().ok_or(StoreError::Uninitialized)?;
        reduce(state, action);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(id: &str, name: &str) -> Agent {
        Agent::new(id, name)
    }

    #[test]
    fn test_new_store_has_default_state() {
        let store = Store::new();
        let state = store.state().unwrap();
        assert!(state.agents.is_empty());
        assert!(state.selected_agent.is_none());
        assert!(state.messages.is_empty());
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_uninitialized_store_rejects_access() {
        let mut store = Store::uninitialized();
        assert_eq!(store.state().unwrap_err(), StoreError::Uninitialized);
        assert_eq!(
            store.dispatch(Action::SetLoading(true)).unwrap_err(),
            StoreError::Uninitialized
        );

        store.init();
        assert!(store.dispatch(Action::SetLoading(true)).is_ok());
        assert!(store.state().unwrap().loading);
    }

    #[test]
    fn test_shutdown_revokes_access() {
        let mut store = Store::new();
        store.dispatch(Action::SetLoading(true)).unwrap();
        store.shutdown();
        assert_eq!(store.state().unwrap_err(), StoreError::Uninitialized);
    }

    #[test]
    fn test_set_agents_replaces_list() {
        let mut store = Store::new();
        store
            .dispatch(Action::SetAgents(vec![agent("1", "A"), agent("2", "B")]))
            .unwrap();
        assert_eq!(store.state().unwrap().agents.len(), 2);

        store.dispatch(Action::SetAgents(vec![agent("3", "C")])).unwrap();
        let state = store.state().unwrap();
        assert_eq!(state.agents.len(), 1);
        assert_eq!(state.agents[0].id, "3");
    }

    #[test]
    fn test_add_message_appends_in_order() {
        let mut store = Store::new();
        for i in 0..5 {
            store
                .dispatch(Action::AddMessage(Message::user(format!("msg {}", i))))
                .unwrap();
            assert_eq!(store.state().unwrap().messages.len(), i + 1);
        }

        let contents: Vec<_> = store
            .state()
            .unwrap()
            .messages
            .iter()
            .map(|m| m.content.clone())
            .collect();
        assert_eq!(contents, vec!["msg 0", "msg 1", "msg 2", "msg 3", "msg 4"]);
    }

    #[test]
    fn test_selecting_agent_clears_messages() {
        let mut store = Store::new();
        store
            .dispatch(Action::SetSelectedAgent(Some(agent("1", "A"))))
            .unwrap();
        store.dispatch(Action::AddMessage(Message::user("hi"))).unwrap();
        assert_eq!(store.state().unwrap().messages.len(), 1);

        store
            .dispatch(Action::SetSelectedAgent(Some(agent("2", "B"))))
            .unwrap();
        let state = store.state().unwrap();
        assert_eq!(state.selected_agent.as_ref().unwrap().id, "2");
        assert!(state.messages.is_empty(), "selecting an agent clears history");
    }

    #[test]
    fn test_deselecting_clears_messages_too() {
        let mut store = Store::new();
        store
            .dispatch(Action::SetSelectedAgent(Some(agent("1", "A"))))
            .unwrap();
        store.dispatch(Action::AddMessage(Message::user("hi"))).unwrap();

        store.dispatch(Action::SetSelectedAgent(None)).unwrap();
        let state = store.state().unwrap();
        assert!(state.selected_agent.is_none());
        assert!(state.messages.is_empty());
    }

    #[test]
    fn test_set_message_delivery_updates_in_place() {
        let mut store = Store::new();
        let msg = Message::user("hello");
        let id = msg.id.clone();
        store.dispatch(Action::AddMessage(msg)).unwrap();

        store
            .dispatch(Action::SetMessageDelivery {
                id: id.clone(),
                delivery: DeliveryStatus::Failed,
            })
            .unwrap();
        let state = store.state().unwrap();
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].delivery, DeliveryStatus::Failed);

        // Unknown IDs are ignored, not an error
        store
            .dispatch(Action::SetMessageDelivery {
                id: "missing".to_string(),
                delivery: DeliveryStatus::Sent,
            })
            .unwrap();
    }

    #[test]
    fn test_set_error_and_clear() {
        let mut store = Store::new();
        store
            .dispatch(Action::SetError(Some("it broke".to_string())))
            .unwrap();
        assert_eq!(store.state().unwrap().error.as_deref(), Some("it broke"));

        store.dispatch(Action::SetError(None)).unwrap();
        assert!(store.state().unwrap().error.is_none());
    }
}
