use std::time::Instant;

use eframe::egui::{self, Align2, RichText};

use super::controller::WidgetController;
use super::style;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PanelAction {
    None,
    Submit,
    OpenIssue,
    Close,
}

/// eframe application hosting the floating feedback button and panel.
pub struct FeedbackWidgetApp {
    controller: WidgetController,
}

impl FeedbackWidgetApp {
    pub fn new(cc: &eframe::CreationContext<'_>, controller: WidgetController) -> Self {
        let mut visuals = egui::Visuals::dark();
        style::apply_visuals(&mut visuals);
        cc.egui_ctx.set_visuals(visuals);
        Self { controller }
    }

    fn render_launcher(&mut self, ctx: &egui::Context) {
        egui::Area::new(egui::Id::new("feedback_launcher"))
            .anchor(Align2::RIGHT_BOTTOM, egui::vec2(-24.0, -24.0))
            .show(ctx, |ui| {
                let button = egui::Button::new(RichText::new("Feedback").size(16.0))
                    .min_size(egui::vec2(96.0, 36.0));
                if ui.add(button).on_hover_text("Open feedback form").clicked() {
                    self.controller.open_panel();
                }
            });
    }

    fn render_backdrop(&self, ctx: &egui::Context) {
        let rect = ctx.viewport_rect();
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Middle,
            egui::Id::new("feedback_backdrop"),
        ));
        painter.rect_filled(rect, 0.0, style::palette().backdrop);
    }

    fn render_panel(&mut self, ctx: &egui::Context) {
        self.render_backdrop(ctx);

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.controller.close_panel();
            return;
        }

        let mut open = true;
        let mut action = PanelAction::None;
        egui::Window::new("Submit Feedback")
            .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .order(egui::Order::Foreground)
            .collapsible(false)
            .resizable(false)
            .default_width(420.0)
            .open(&mut open)
            .show(ctx, |ui| {
                action = self.render_panel_body(ui);
            });

        if !open {
            self.controller.close_panel();
            return;
        }
        match action {
            PanelAction::None => {}
            PanelAction::Submit => self.controller.submit(),
            PanelAction::OpenIssue => self.controller.open_issue_link(),
            PanelAction::Close => self.controller.close_panel(),
        }
    }

    fn render_panel_body(&mut self, ui: &mut egui::Ui) -> PanelAction {
        let palette = style::palette();
        let state = &mut self.controller.state;
        let submitting = state.submitting;
        let mut action = PanelAction::None;
        ui.set_min_width(420.0);

        if let Some(status) = &state.status {
            ui.label(RichText::new(&status.message).color(style::status_color(status.tone)));
            if state.last_issue_url.is_some() {
                ui.horizontal(|ui| {
                    if ui.button("Open issue in browser").clicked() {
                        action = PanelAction::OpenIssue;
                    }
                    if ui.button("Close").clicked() {
                        action = PanelAction::Close;
                    }
                });
            }
            ui.add_space(8.0);
        }

        ui.label(RichText::new("Name").color(palette.text_primary));
        let name_response = ui.add_enabled(
            !submitting,
            egui::TextEdit::singleline(&mut state.name)
                .hint_text("Your name")
                .desired_width(400.0),
        );
        if state.focus_name_requested && !name_response.has_focus() && !submitting {
            name_response.request_focus();
            state.focus_name_requested = false;
        }
        ui.add_space(6.0);

        ui.label(RichText::new("Email").color(palette.text_primary));
        ui.add_enabled(
            !submitting,
            egui::TextEdit::singleline(&mut state.email)
                .hint_text("you@example.com")
                .desired_width(400.0),
        );
        ui.add_space(6.0);

        ui.label(RichText::new("Message").color(palette.text_primary));
        ui.add_enabled(
            !submitting,
            egui::TextEdit::multiline(&mut state.message)
                .hint_text("What's on your mind?")
                .desired_width(400.0)
                .desired_rows(5)
                .lock_focus(true),
        );

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            let label = if submitting { "Submitting…" } else { "Submit" };
            if ui
                .add_enabled(!submitting, egui::Button::new(label))
                .clicked()
            {
                action = PanelAction::Submit;
            }
            if submitting {
                ui.add(egui::Spinner::new());
                ui.label(RichText::new("Sending feedback…").color(palette.text_muted));
            }
        });
        action
    }
}

impl eframe::App for FeedbackWidgetApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.controller.poll(now);
        self.controller.tick(now);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() / 3.0);
                ui.heading("Feedbox");
                ui.label(
                    RichText::new("Use the button in the corner to send feedback.")
                        .color(style::palette().text_muted),
                );
            });
        });

        if self.controller.state.open {
            self.render_panel(ctx);
        } else {
            self.render_launcher(ctx);
        }

        if let Some(wait) = self.controller.next_wakeup(now) {
            ctx.request_repaint_after(wait);
        }
    }
}
