use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use lwv_client_core::{
    OperationKind, OperationOutcome, SessionSnapshot, StatsOutcome, StatsTicket,
    WorkflowController,
};
use lwv_scene::{project, Scene, ViewTransport};
use lwv_shared::{domain::PrimitiveId, geometry::primitive_count};
use tokio::sync::watch;

use crate::backend_bridge::commands::BackendCommand;
use crate::config::AppConfig;
use crate::controller::events::{UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::{canvas, panels, theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Error,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

pub struct LwvApp {
    controller: WorkflowController,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    store_updates: watch::Receiver<u64>,
    snapshot: SessionSnapshot,
    scene: Scene,
    view: ViewTransport,
    nets_filter: String,
    /// Latest stats fetch issued from the UI.
    stats_pending: Option<StatsTicket>,
    status: String,
    status_banner: Option<StatusBanner>,
    pick_radius_px: f64,
    visuals_applied: bool,
}

impl LwvApp {
    pub fn new(
        controller: WorkflowController,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        config: &AppConfig,
    ) -> Self {
        let mut store_updates = controller.store().subscribe();
        store_updates.mark_unchanged();
        let snapshot = controller.store().snapshot();
        let scene = project(&snapshot.nets, snapshot.selected.as_ref());
        let mut view = ViewTransport::new(config.min_zoom, config.max_zoom);
        view.sync_geometry(snapshot.nets_revision, scene.window);

        let status = if config.engine_url.is_some() {
            "Starting engine worker".to_string()
        } else {
            "No engine configured; set engine_url or pass --engine-url".to_string()
        };

        Self {
            controller,
            cmd_tx,
            ui_rx,
            store_updates,
            snapshot,
            scene,
            view,
            nets_filter: String::new(),
            stats_pending: None,
            status,
            status_banner: None,
            pick_radius_px: config.pick_radius_px,
            visuals_applied: false,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => self.show_error(&err),
                UiEvent::OperationFinished { kind, result } => match result {
                    Ok(outcome) => {
                        self.status = describe_outcome(&outcome);
                        if let OperationOutcome::Generated {
                            stats: StatsOutcome::Failed(message),
                            ..
                        } = &outcome
                        {
                            self.status_banner = Some(StatusBanner {
                                severity: StatusBannerSeverity::Error,
                                message: format!("Refreshing statistics failed: {message}"),
                            });
                        } else if kind != OperationKind::Save {
                            self.status_banner = None;
                        }
                    }
                    Err(err) => self.show_error(&err),
                },
                UiEvent::StatsFinished { ticket, result } => {
                    if self.stats_pending.as_ref() == Some(&ticket) {
                        self.stats_pending = None;
                    }
                    match result {
                        Ok(StatsOutcome::Applied { present: false }) => {
                            self.status = format!(
                                "No variation data for primitive {}",
                                ticket.primitive_id()
                            );
                        }
                        Ok(_) => {}
                        Err(err) => self.show_error(&err),
                    }
                }
            }
        }
    }

    /// Pulls a fresh snapshot when the store changed and rebuilds the scene
    /// if the nets or the selection moved.
    fn refresh_from_store(&mut self) {
        if !self.store_updates.has_changed().unwrap_or(false) {
            return;
        }
        self.store_updates.mark_unchanged();
        let snapshot = self.controller.store().snapshot();
        let geometry_changed = snapshot.nets_revision != self.snapshot.nets_revision
            || snapshot.selected != self.snapshot.selected;
        self.snapshot = snapshot;
        if geometry_changed {
            self.scene = project(&self.snapshot.nets, self.snapshot.selected.as_ref());
            if self.view.sync_geometry(self.snapshot.nets_revision, self.scene.window) {
                tracing::debug!(revision = ?self.snapshot.nets_revision, "view refit to new nets");
            }
        }
    }

    fn start_operation(&mut self, kind: OperationKind) {
        let operation = match self.controller.begin(kind) {
            Ok(operation) => operation,
            Err(err) => {
                self.status = format!("Cannot {} now: {err}", kind.as_str());
                return;
            }
        };
        if let Some(BackendCommand::Run(operation)) = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Run(operation),
            &mut self.status,
        ) {
            self.controller.abandon(operation);
        }
    }

    fn select(&mut self, id: Option<PrimitiveId>) {
        let Some(ticket) = self.controller.select_primitive(id) else {
            return;
        };
        self.stats_pending = Some(ticket.clone());
        if dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::FetchStats(ticket),
            &mut self.status,
        )
        .is_some()
        {
            self.stats_pending = None;
        }
    }

    fn show_error(&mut self, err: &UiError) {
        self.status = err.summary();
        self.status_banner = Some(StatusBanner {
            severity: StatusBannerSeverity::Error,
            message: err.summary(),
        });
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            let (fill, stroke) = match banner.severity {
                StatusBannerSeverity::Error => (
                    theme::BANNER_FILL,
                    egui::Stroke::new(1.0, theme::BANNER_STROKE),
                ),
            };

            egui::Frame::NONE
                .fill(fill)
                .stroke(stroke)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                                self.controller.acknowledge_error();
                            }
                        });
                    });
                });
        }
    }

    fn show_toolbar(&mut self, ui: &mut egui::Ui, busy: bool) {
        ui.horizontal(|ui| {
            ui.heading("Line Width Variator");
            ui.separator();
            if ui.add_enabled(!busy, egui::Button::new("Open")).clicked() {
                self.start_operation(OperationKind::Open);
            }
            if ui.add_enabled(!busy, egui::Button::new("Save As")).clicked() {
                self.start_operation(OperationKind::Save);
            }
            if ui
                .add_enabled(!busy, egui::Button::new("Generate"))
                .clicked()
            {
                self.start_operation(OperationKind::Generate);
            }
            if ui.button("Fit").clicked() {
                self.view.reset();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("zoom {:.2}x", self.view.zoom()));
                ui.separator();
                ui.label(format!(
                    "{} nets / {} primitives",
                    self.snapshot.nets.len(),
                    primitive_count(&self.snapshot.nets)
                ));
            });
        });
    }

    fn stats_loading(&self) -> bool {
        self.snapshot.loading
            || self
                .stats_pending
                .as_ref()
                .is_some_and(|ticket| self.controller.store().is_current(ticket))
    }
}

pub fn describe_outcome(outcome: &OperationOutcome) -> String {
    match outcome {
        OperationOutcome::Opened { path, nets } => {
            format!("Loaded {} ({nets} nets)", path.display())
        }
        OperationOutcome::Saved { path } => format!("Saved {}", path.display()),
        OperationOutcome::Generated { nets, stats } => match stats {
            StatsOutcome::Failed(_) => {
                format!("Variation generated ({nets} nets); statistics refresh failed")
            }
            _ => format!("Variation generated ({nets} nets)"),
        },
        OperationOutcome::Cancelled => "Cancelled".to_string(),
    }
}

impl eframe::App for LwvApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.visuals_applied {
            ctx.set_visuals(theme::visuals());
            self.visuals_applied = true;
        }

        self.process_ui_events();
        self.refresh_from_store();

        let state = self.controller.state();
        let busy = state.is_busy();

        if ctx.input(|input| input.key_pressed(egui::Key::Escape)) {
            self.select(None);
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.show_toolbar(ui, busy);
        });

        if self.status_banner.is_some() {
            egui::TopBottomPanel::top("status_banner").show(ctx, |ui| {
                self.show_status_banner(ui);
            });
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(state.to_string());
                });
            });
        });

        let settings_response = egui::SidePanel::left("settings_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                panels::show_settings_panel(ui, &self.snapshot.settings, !busy)
            })
            .inner;
        if !settings_response.patch.is_empty() {
            let settings = self.controller.store().update_settings(&settings_response.patch);
            tracing::debug!(?settings, "settings edited");
        }
        if settings_response.generate {
            self.start_operation(OperationKind::Generate);
        }

        let listed = egui::SidePanel::right("nets_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                panels::show_nets_panel(
                    ui,
                    &self.snapshot.nets,
                    self.snapshot.selected.as_ref(),
                    &mut self.nets_filter,
                )
            })
            .inner;

        egui::TopBottomPanel::bottom("stats_panel")
            .resizable(true)
            .default_height(220.0)
            .show(ctx, |ui| {
                let view = panels::stats_view(
                    self.snapshot.selected.as_ref(),
                    self.stats_loading(),
                    self.snapshot.stats.as_ref(),
                );
                panels::show_stats_panel(ui, self.snapshot.selected.as_ref(), view);
            });

        let picked = egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(theme::CANVAS_BACKGROUND))
            .show(ctx, |ui| {
                let overlay = busy.then_some("Processing...");
                canvas::show_canvas(
                    ui,
                    &self.scene,
                    &mut self.view,
                    self.pick_radius_px,
                    overlay,
                )
            })
            .inner;

        if let Some(id) = listed.or(picked) {
            self.select(Some(id));
        }

        if busy || self.stats_pending.is_some() {
            ctx.request_repaint_after(Duration::from_millis(33));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn outcome_descriptions_name_what_happened() {
        assert_eq!(
            describe_outcome(&OperationOutcome::Opened {
                path: PathBuf::from("board.aedb"),
                nets: 3
            }),
            "Loaded board.aedb (3 nets)"
        );
        assert_eq!(
            describe_outcome(&OperationOutcome::Generated {
                nets: 2,
                stats: StatsOutcome::Failed("timeout".to_string())
            }),
            "Variation generated (2 nets); statistics refresh failed"
        );
        assert_eq!(describe_outcome(&OperationOutcome::Cancelled), "Cancelled");
    }
}
