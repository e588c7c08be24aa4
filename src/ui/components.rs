// Reusable UI components
// Provides common UI elements for the chat view

use crate::api::types::{DeliveryStatus, Message, MessageRole};
use eframe::egui;

/// Render a colored role label for a message sender
pub fn role_label(ui: &mut egui::Ui, role: MessageRole) {
    let (text, text_color) = match role {
        MessageRole::User => ("You", egui::Color32::from_rgb(100, 150, 255)), // Blue
        MessageRole::Assistant => ("Assistant", egui::Color32::from_rgb(0, 200, 0)), // Green
    };
    ui.label(egui::RichText::new(text).color(text_color).strong().size(12.0));
}

/// Render a delivery marker next to a message's timestamp
///
/// Delivered messages show nothing; pending and failed states are marked so
/// the optimistic-update path is visible instead of ambiguous.
pub fn delivery_marker(ui: &mut egui::Ui, delivery: DeliveryStatus) {
    match delivery {
        DeliveryStatus::Sent => {}
        DeliveryStatus::Pending => {
            ui.label(egui::RichText::new("sending…").weak().italics().size(11.0));
        }
        DeliveryStatus::Failed => {
            ui.label(
                egui::RichText::new("failed")
                    .color(egui::Color32::from_rgb(220, 0, 0))
                    .size(11.0),
            );
        }
    }
}

/// Render a single message bubble
pub fn message_bubble(ui: &mut egui::Ui, message: &Message) {
    ui.group(|ui| {
        ui.vertical(|ui| {
            ui.horizontal(|ui| {
                role_label(ui, message.role);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    delivery_marker(ui, message.delivery);
                    ui.label(
                        egui::RichText::new(message.timestamp.format("%H:%M:%S").to_string())
                            .weak()
                            .size(11.0),
                    );
                });
            });
            ui.add_space(2.0);
            ui.label(&message.content);
        });
    });
}

/// Render the typing indicator shown while a reply is in flight
pub fn typing_indicator(ui: &mut egui::Ui) {
    ui.group(|ui| {
        ui.horizontal(|ui| {
            role_label(ui, MessageRole::Assistant);
            ui.label(egui::RichText::new("typing…").weak().italics());
        });
    });
}

/// Render a dismissible error banner
///
/// Returns true if the user dismissed the error.
pub fn error_banner(ui: &mut egui::Ui, error: &str) -> bool {
    let mut dismissed = false;
    ui.horizontal(|ui| {
        ui.colored_label(egui::Color32::from_rgb(220, 0, 0), error);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("Dismiss").clicked() {
                dismissed = true;
            }
        });
    });
    dismissed
}
