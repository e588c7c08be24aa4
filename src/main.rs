//! Local Jarvis Chat - Main Entry Point
//!
//! Native desktop chat client for a local personal assistant backend. Wires
//! the configuration, token store, API client, message backend, and chat
//! controller together, then hands control to the egui event loop.

use eframe::egui;
use jarvis_chat_gui::api::{ApiClient, TokenStore};
use jarvis_chat_gui::backend::{HttpMessageBackend, MessageBackend, SimulatedBackend};
use jarvis_chat_gui::config::Config;
use jarvis_chat_gui::controller::ChatController;
use jarvis_chat_gui::ui::{render_app_layout, ViewState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    tracing::info!(
        api_base_url = %config.api_base_url,
        simulate = config.simulate,
        "Starting Jarvis chat client"
    );

    // Background tasks run on this runtime; the UI thread only drains their
    // completion events.
    let runtime = tokio::runtime::Runtime::new()?;

    let tokens = Arc::new(TokenStore::new(config.token_path()));
    let unauthorized = Arc::new(AtomicBool::new(false));
    let flag = unauthorized.clone();
    let api = Arc::new(
        ApiClient::new(&config, tokens)
            .map_err(|e| anyhow::anyhow!("failed to build API client: {}", e))?
            .with_unauthorized_handler(Arc::new(move || {
                flag.store(true, Ordering::SeqCst);
            })),
    );

    let backend: Arc<dyn MessageBackend> = if config.simulate {
        tracing::info!("Using simulated message backend");
        Arc::new(SimulatedBackend::new(Duration::from_secs(1)))
    } else {
        Arc::new(HttpMessageBackend::new(api.clone()))
    };

    let mut controller = ChatController::new(api, backend, runtime.handle().clone());
    if let Err(err) = controller.load_agents() {
        tracing::error!(%err, "Failed to start initial agent fetch");
    }
    if let Err(err) = controller.load_current_user() {
        tracing::error!(%err, "Failed to start current-user fetch");
    }

    // Configure window options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Jarvis Chat")
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Jarvis Chat",
        options,
        Box::new(move |_cc| Box::new(JarvisChatApp::new(controller, unauthorized))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run UI: {}", e))
}

/// Main application struct
/// Holds the chat controller and view-local widget state
struct JarvisChatApp {
    /// Chat flow controller (owns the store and background tasks)
    controller: ChatController,
    /// View-local widget state (input draft, dialogs)
    view: ViewState,
    /// Set by the API client when the backend rejects our credentials
    unauthorized: Arc<AtomicBool>,
}

impl JarvisChatApp {
    /// Create a new application instance
    fn new(controller: ChatController, unauthorized: Arc<AtomicBool>) -> Self {
        Self {
            controller,
            view: ViewState::new(),
            unauthorized,
        }
    }
}

impl eframe::App for JarvisChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply completion events from background tasks before drawing
        if let Err(err) = self.controller.poll_events() {
            tracing::error!(%err, "Failed to apply completion events");
        }

        let unauthorized = self.unauthorized.load(Ordering::SeqCst);
        render_app_layout(ctx, &mut self.controller, &mut self.view, unauthorized);

        // Keep repainting while a call is in flight so its completion event
        // is drained without waiting for user input.
        let loading = self.controller.state().map(|s| s.loading).unwrap_or(false);
        if loading {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
