// UI module
// Contains layout, components, and view-local widget state

pub mod components;
pub mod layout;

pub use layout::render_app_layout;

/// Widget-local state that does not belong in the application store
///
/// Draft input, dialog visibility, and form fields live here; the store only
/// holds state with cross-component meaning.
#[derive(Debug, Default)]
pub struct ViewState {
    /// Draft text in the chat input box
    pub input: String,
    /// Whether the agent sidebar is visible
    pub sidebar_visible: bool,
    /// Whether the new-agent dialog is open
    pub show_new_agent: bool,
    /// Draft name in the new-agent dialog
    pub new_agent_name: String,
    /// Whether the tools browser is open
    pub show_tools: bool,
    /// Draft MCP server name to query for tools
    pub mcp_server_query: String,
    /// Draft name in the add-MCP-server form
    pub mcp_new_name: String,
    /// Draft command in the add-MCP-server form
    pub mcp_new_command: String,
    /// Draft arguments (space separated) in the add-MCP-server form
    pub mcp_new_args: String,
}

impl ViewState {
    /// Create the default view state with the sidebar visible
    pub fn new() -> Self {
        Self {
            sidebar_visible: true,
            ..Default::default()
        }
    }
}
