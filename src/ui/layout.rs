// Main application layout
// Handles window layout, panels, menu bar, and overall UI structure

use crate::api::types::{AddMcpServerRequest, Agent, Message};
use crate::controller::ChatController;
use crate::error::StoreError;
use crate::ui::components::*;
use crate::ui::ViewState;
use eframe::egui;

/// Render the main application layout
/// Includes menu bar, agent sidebar, chat panel, input row, and dialogs
pub fn render_app_layout(
    ctx: &egui::Context,
    controller: &mut ChatController,
    view: &mut ViewState,
    unauthorized: bool,
) {
    if unauthorized {
        render_signin_notice(ctx);
        return;
    }

    render_menu_bar(ctx, controller, view);

    // Snapshot the state before handing the controller to widgets; clicks
    // dispatch mutations, so widgets must not hold a borrow of the state.
    let (agents, selected, messages, loading, error) = match controller.state() {
        Ok(state) => (
            state.agents.clone(),
            state.selected_agent.clone(),
            state.messages.clone(),
            state.loading,
            state.error.clone(),
        ),
        Err(err) => {
            tracing::error!(%err, "Store unavailable");
            return;
        }
    };

    if view.sidebar_visible {
        render_sidebar(ctx, controller, view, &agents, selected.as_ref());
    }

    if let Some(agent) = &selected {
        render_input_panel(ctx, controller, view, agent, loading);
    }

    egui::CentralPanel::default().show(ctx, |ui| {
        if let Some(err) = &error {
            if error_banner(ui, err) {
                log_store_err(controller.clear_error());
            }
            ui.separator();
        }

        match &selected {
            Some(agent) => render_chat_panel(ui, controller, agent, &messages, loading),
            None => render_welcome_view(ui),
        }
    });

    render_new_agent_window(ctx, controller, view);
    render_tools_window(ctx, controller, view);
}

fn log_store_err(result: Result<(), StoreError>) {
    if let Err(err) = result {
        tracing::error!(%err, "Store dispatch failed");
    }
}

/// Render the top menu bar
fn render_menu_bar(ctx: &egui::Context, controller: &mut ChatController, view: &mut ViewState) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            // File menu
            ui.menu_button("File", |ui| {
                if ui.button("Refresh Agents").clicked() {
                    log_store_err(controller.load_agents());
                    ui.close_menu();
                }
                if ui.button("New Agent…").clicked() {
                    view.show_new_agent = true;
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            // View menu
            ui.menu_button("View", |ui| {
                ui.checkbox(&mut view.sidebar_visible, "Show Sidebar");
                let mut dark_mode = ctx.style().visuals.dark_mode;
                if ui.checkbox(&mut dark_mode, "Dark Mode").changed() {
                    ctx.style_mut(|style| {
                        style.visuals.dark_mode = dark_mode;
                    });
                }
            });

            // Tools menu
            ui.menu_button("Tools", |ui| {
                if ui.button("Manage Tools…").clicked() {
                    view.show_tools = true;
                    log_store_err(controller.load_tools());
                    ui.close_menu();
                }
            });

            if let Some(user) = controller.current_user() {
                let signed_in = format!("Signed in as {}", user.name);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(signed_in).weak().size(12.0));
                });
            }
        });
    });
}

/// Render the left sidebar with the agent list
fn render_sidebar(
    ctx: &egui::Context,
    controller: &mut ChatController,
    view: &mut ViewState,
    agents: &[Agent],
    selected: Option<&Agent>,
) {
    egui::SidePanel::left("agent_sidebar")
        .resizable(true)
        .default_width(250.0)
        .min_width(150.0)
        .show(ctx, |ui| {
            ui.add_space(8.0);
            ui.heading("Agents");
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                if ui.button("New Agent").clicked() {
                    view.show_new_agent = true;
                }
                if ui.button("Manage Tools").clicked() {
                    view.show_tools = true;
                    log_store_err(controller.load_tools());
                }
            });

            ui.add_space(4.0);
            ui.separator();
            ui.add_space(4.0);

            // Agent list fills the remaining vertical space in the sidebar
            egui::ScrollArea::vertical()
                .id_source("agent_list_scroll")
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    if agents.is_empty() {
                        ui.vertical_centered(|ui| {
                            ui.add_space(40.0);
                            ui.label(egui::RichText::new("No agents").italics().weak().size(14.0));
                            ui.add_space(8.0);
                            ui.label(
                                egui::RichText::new("Refresh from File > Refresh Agents")
                                    .weak()
                                    .size(12.0),
                            );
                        });
                    } else {
                        for agent in agents {
                            let is_selected = selected.map(|s| s.id == agent.id).unwrap_or(false);
                            if ui.selectable_label(is_selected, &agent.name).clicked() {
                                // Clicking the selected agent toggles back to Idle
                                let next = if is_selected { None } else { Some(agent.clone()) };
                                log_store_err(controller.select_agent(next));
                            }
                            ui.add_space(2.0);
                        }
                    }
                });
        });
}

/// Render the chat input row at the bottom of the window
fn render_input_panel(
    ctx: &egui::Context,
    controller: &mut ChatController,
    view: &mut ViewState,
    agent: &Agent,
    loading: bool,
) {
    egui::TopBottomPanel::bottom("chat_input").show(ctx, |ui| {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let hint = format!("Message {}…", agent.name);
            let input = ui.add_sized(
                [ui.available_width() - 70.0, 24.0],
                egui::TextEdit::singleline(&mut view.input)
                    .hint_text(hint)
                    .interactive(!loading),
            );

            let can_send = !loading && !view.input.trim().is_empty();
            let send_clicked = ui.add_enabled(can_send, egui::Button::new("Send")).clicked();
            let enter_pressed =
                input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if send_clicked || (enter_pressed && can_send) {
                log_store_err(controller.send_message(&view.input));
                view.input.clear();
                input.request_focus();
            }
        });
        ui.add_space(8.0);
    });
}

/// Render the conversation with the selected agent
fn render_chat_panel(
    ui: &mut egui::Ui,
    controller: &mut ChatController,
    agent: &Agent,
    messages: &[Message],
    loading: bool,
) {
    ui.horizontal(|ui| {
        ui.heading(format!("Chat with {}", agent.name));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Delete Agent").clicked() {
                log_store_err(controller.delete_agent(agent.id.clone()));
            }
            if ui.button("Load History").clicked() {
                log_store_err(controller.load_history());
            }
        });
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .id_source("chat_scroll")
        .auto_shrink([false; 2])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            if messages.is_empty() && !loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.label(egui::RichText::new("No messages yet").italics().weak());
                    ui.add_space(8.0);
                    ui.label(
                        egui::RichText::new(format!("Say hello to {}", agent.name))
                            .weak()
                            .size(12.0),
                    );
                });
            }

            for message in messages {
                message_bubble(ui, message);
                ui.add_space(4.0);
            }

            if loading {
                typing_indicator(ui);
            }
        });
}

/// Render the welcome view when no agent is selected
fn render_welcome_view(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(80.0);
        ui.heading(egui::RichText::new("Welcome to the Local Jarvis System").size(24.0));
        ui.add_space(12.0);
        ui.label(egui::RichText::new("Your intelligent personal assistant").weak().size(14.0));
        ui.add_space(24.0);
        ui.label(
            egui::RichText::new("Select an agent from the sidebar to start a conversation")
                .size(14.0),
        );
    });
}

/// Render the notice shown once the backend has rejected our credentials
fn render_signin_notice(ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(120.0);
            ui.heading(egui::RichText::new("Session expired").size(24.0));
            ui.add_space(16.0);
            ui.label("The backend rejected your credentials and the stored token was cleared.");
            ui.label("Sign in again from the backend console, then restart the application.");
        });
    });
}

/// Render the new-agent dialog window
fn render_new_agent_window(
    ctx: &egui::Context,
    controller: &mut ChatController,
    view: &mut ViewState,
) {
    if !view.show_new_agent {
        return;
    }

    let mut open = true;
    egui::Window::new("New Agent")
        .open(&mut open)
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Name:");
                ui.text_edit_singleline(&mut view.new_agent_name);
            });
            ui.add_space(8.0);

            let can_create = !view.new_agent_name.trim().is_empty();
            if ui.add_enabled(can_create, egui::Button::new("Create")).clicked() {
                log_store_err(controller.create_agent(view.new_agent_name.trim().to_string()));
                view.new_agent_name.clear();
                view.show_new_agent = false;
            }
        });

    if !open {
        view.show_new_agent = false;
    }
}

/// Render the tools browser window
fn render_tools_window(ctx: &egui::Context, controller: &mut ChatController, view: &mut ViewState) {
    if !view.show_tools {
        return;
    }

    let tools = controller.tools().to_vec();
    let mcp_tools = controller.mcp_tools().to_vec();
    let mcp_server = controller.mcp_server().map(str::to_string);

    let mut open = true;
    egui::Window::new("Tools")
        .open(&mut open)
        .default_width(360.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Available Tools");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("Refresh").clicked() {
                        log_store_err(controller.load_tools());
                    }
                });
            });
            ui.add_space(4.0);

            if tools.is_empty() {
                ui.label(egui::RichText::new("No tools loaded").weak().italics());
            } else {
                for tool in &tools {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(&tool.name).strong());
                        if let Some(desc) = &tool.description {
                            ui.label(egui::RichText::new(desc).weak().size(12.0));
                        }
                    });
                }
            }

            ui.add_space(8.0);
            ui.separator();
            ui.heading("MCP Servers");
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                ui.label("Server:");
                ui.text_edit_singleline(&mut view.mcp_server_query);
                let can_fetch = !view.mcp_server_query.trim().is_empty();
                if ui.add_enabled(can_fetch, egui::Button::new("Fetch Tools")).clicked() {
                    log_store_err(
                        controller.load_mcp_tools(view.mcp_server_query.trim().to_string()),
                    );
                }
            });

            if let Some(server) = &mcp_server {
                ui.add_space(4.0);
                ui.label(format!("Tools on '{}':", server));
                if mcp_tools.is_empty() {
                    ui.label(egui::RichText::new("none").weak().italics());
                } else {
                    for tool in &mcp_tools {
                        ui.label(egui::RichText::new(&tool.name).strong());
                    }
                }
            }

            ui.add_space(8.0);
            ui.separator();
            ui.label(egui::RichText::new("Register a new MCP server").strong());
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                ui.label("Name:");
                ui.text_edit_singleline(&mut view.mcp_new_name);
            });
            ui.horizontal(|ui| {
                ui.label("Command:");
                ui.text_edit_singleline(&mut view.mcp_new_command);
            });
            ui.horizontal(|ui| {
                ui.label("Args:");
                ui.text_edit_singleline(&mut view.mcp_new_args);
            });

            let can_add = !view.mcp_new_name.trim().is_empty()
                && !view.mcp_new_command.trim().is_empty();
            if ui.add_enabled(can_add, egui::Button::new("Add Server")).clicked() {
                let req = AddMcpServerRequest {
                    server_name: view.mcp_new_name.trim().to_string(),
                    command: view.mcp_new_command.trim().to_string(),
                    args: view
                        .mcp_new_args
                        .split_whitespace()
                        .map(str::to_string)
                        .collect(),
                };
                log_store_err(controller.add_mcp_server(req));
                view.mcp_new_name.clear();
                view.mcp_new_command.clear();
                view.mcp_new_args.clear();
            }
        });

    if !open {
        view.show_tools = false;
    }
}
