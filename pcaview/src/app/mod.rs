pub mod common;
mod components;
pub mod config;
mod events;

use self::components::{ArtifactKind, Artifacts, Dataset, GroupPanel};
use crate::app::events::EventQueue;
use crate::backend_state::Gateway;
use crate::state::color_groups::ColorGroups;
use crate::BackendAppState;
use app_core::backend::{BackendEventLoop, BackendLink, BackendRequest};
use app_core::frontend::UIParameter;
use common::parse_color;
use config::Config;
use events::{OpenFileRequested, ToggleArtifact};

use std::{sync::mpsc::Sender, thread::JoinHandle};

pub type DynRequestSender = Sender<Box<dyn BackendRequest<BackendAppState>>>;

pub struct EguiApp {
    config: Config,
    backend_thread_handle: Option<JoinHandle<()>>,
    request_tx: DynRequestSender,
    dataset: Dataset,
    artifacts: Artifacts,
    color_groups: ColorGroups,
    group_panel: GroupPanel,
    /// Base URL of the service the backend talks to.
    service_url: UIParameter<String>,
    dataset_id_input: String,
    alert: Option<String>,
    shortcuts_modal_open: bool,
    ui_selection: UISelection,
    event_queue: EventQueue<Self>,
    request_redraw: Option<()>,
}

#[derive(Debug, PartialEq, Eq)]
enum UISelection {
    Analysis,
    Data,
    Preferences,
}

impl UISelection {
    fn next(&self) -> Self {
        match self {
            UISelection::Analysis => Self::Data,
            UISelection::Data => Self::Analysis,
            UISelection::Preferences => Self::Analysis,
        }
    }
}

impl EguiApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: Config,
        request_tx: Sender<Box<dyn BackendRequest<BackendAppState>>>,
        backend_thread_handle: JoinHandle<()>,
    ) -> Self {
        let mut dataset = Dataset::new(request_tx.clone());
        if let Some(path) = &config.start_file {
            dataset.load_file(path.clone());
        } else if let Some(id) = &config.dataset_id {
            dataset.fetch_stored(id);
        }

        Self {
            backend_thread_handle: Some(backend_thread_handle),
            dataset,
            artifacts: Artifacts::new(request_tx.clone()),
            color_groups: ColorGroups::default(),
            group_panel: GroupPanel::default(),
            service_url: UIParameter::new(config.backend_url.clone()),
            dataset_id_input: config.dataset_id.clone().unwrap_or_default(),
            config,
            request_tx,
            alert: None,
            shortcuts_modal_open: false,
            ui_selection: UISelection::Analysis,
            event_queue: EventQueue::<Self>::new(),
            request_redraw: None,
        }
    }

    fn update_state(&mut self) {
        self.run_events();
        let dataset_changed = self.dataset.try_update();
        let artifacts_changed = self.artifacts.try_update(&mut self.color_groups);
        if dataset_changed || artifacts_changed || self.service_url.try_update() {
            self.request_redraw();
        }
    }

    pub fn request_redraw(&mut self) {
        self.request_redraw = Some(());
    }

    fn is_busy(&self) -> bool {
        self.dataset.is_loading() || self.artifacts.is_loading() || !self.event_queue.is_empty()
    }

    fn open_file_dialog(&mut self) {
        log::debug!("open dialog to select data file");
        let handle = std::thread::spawn(|| {
            rfd::FileDialog::new()
                .add_filter("Delimited text", &["csv", "tsv", "txt"])
                .pick_file()
        });
        let event = OpenFileRequested::new(Some(handle));
        self.event_queue.queue_event(Box::new(event));
    }

    fn toggle_artifact(&mut self, kind: ArtifactKind) {
        self.event_queue
            .queue_event(Box::new(ToggleArtifact::new(kind)));
    }

    /// Points the backend at the service configured in the preferences.
    fn apply_connection_settings(&mut self) {
        let gateway = Gateway::new(&self.config.backend_url, self.config.timeout());
        BackendLink::request_parameter_update(
            &mut self.service_url,
            "switch PCA service",
            move |b: &mut BackendEventLoop<BackendAppState>| {
                b.state.set_gateway(gateway.clone());
                b.state.gateway().base_url().to_owned()
            },
            &self.request_tx,
        );
    }
}

impl eframe::App for EguiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.request_redraw.take().is_some() {
            ctx.request_repaint();
        }
        // Answers arrive from the backend without any input event.
        if self.is_busy() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        self.update_state();

        let mut should_quit = false;

        // Handle keyboard input.
        ctx.input(|i| {
            // Help window.
            if i.key_pressed(egui::Key::F1) {
                self.shortcuts_modal_open = !self.shortcuts_modal_open;
            }
            // Circle main window view.
            if i.key_pressed(egui::Key::F3) {
                self.ui_selection = self.ui_selection.next();
            }
            // Close app.
            if i.key_pressed(egui::Key::F10) {
                // Quitting cannot be requested from within here, the UI stops,
                // but not the backend thread.
                should_quit = true;
            }
            // Open preferences.
            if i.key_pressed(egui::Key::F12) {
                self.ui_selection = UISelection::Preferences;
            }
        });
        if ctx.input(|i| i.key_pressed(egui::Key::O) && i.modifiers.command) {
            self.open_file_dialog();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::G) && i.modifiers.command) {
            self.dataset.generate();
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.render_shortcut_modal(ctx);
            self.render_alert(ctx);
            self.menu(ui, ctx);
            ui.separator();
            self.toolbar(ui);
        });

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            self.status_line(ui);
        });

        if self.ui_selection == UISelection::Analysis {
            egui::SidePanel::left("group_panel")
                .resizable(true)
                .default_width(220.0)
                .show(ctx, |ui| {
                    self.group_panel
                        .render(&self.color_groups, &mut self.event_queue, ui, ctx);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.central_panel(ui);
        });

        if should_quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(handle) = self.backend_thread_handle.take() {
            app_core::backend::request_stop(&self.request_tx, handle);
        }
    }
}

impl EguiApp {
    fn central_panel(&mut self, ui: &mut egui::Ui) {
        use UISelection as U;
        match self.ui_selection {
            U::Analysis => {
                let default_color =
                    parse_color(&self.config.default_color).unwrap_or(egui::Color32::DARK_GRAY);
                self.artifacts
                    .render(&mut self.event_queue, default_color, ui)
            }
            U::Data => self.dataset.render(&mut self.event_queue, ui),
            U::Preferences => {
                if self.config.render(ui) {
                    self.apply_connection_settings();
                }
            }
        }
    }

    fn menu(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open CSV …").clicked() {
                    self.open_file_dialog();
                    ui.close_menu();
                }
                if ui.button("Generate random data").clicked() {
                    self.dataset.generate();
                    ui.close_menu();
                }
                ui.menu_button("Fetch stored dataset", |ui| {
                    ui.horizontal(|ui| {
                        ui.label("ID");
                        ui.text_edit_singleline(&mut self.dataset_id_input);
                    });
                    if ui.button("Fetch").clicked() {
                        self.dataset.fetch_stored(&self.dataset_id_input);
                        ui.close_menu();
                    }
                });
                if ui.button("Preferences").clicked() {
                    self.ui_selection = UISelection::Preferences;
                    ui.close_menu();
                };
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            // Selection of ui view.
            ui.menu_button("View", |ui| {
                ui.selectable_value(&mut self.ui_selection, UISelection::Analysis, "Analysis");
                ui.selectable_value(&mut self.ui_selection, UISelection::Data, "Data");
            });

            ui.toggle_value(&mut self.shortcuts_modal_open, "Help (F1)");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                egui::widgets::global_theme_preference_buttons(ui);
            });
        });
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for kind in ArtifactKind::ALL {
                let label = if self.artifacts.is_kind_loading(kind) {
                    format!("{kind} …")
                } else {
                    kind.to_string()
                };
                let active = self.artifacts.is_visible(kind) || self.artifacts.is_kind_loading(kind);
                if ui.selectable_label(active, label).clicked() {
                    self.ui_selection = UISelection::Analysis;
                    self.toggle_artifact(kind);
                }
            }
        });
    }

    fn status_line(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            match self.dataset.current() {
                Some(table) => ui.label(format!(
                    "{}: {} samples",
                    self.dataset.source(),
                    table.len()
                )),
                None => ui.label("No data"),
            };
            ui.separator();
            ui.label(format!("Service: {}", self.service_url.value()));
            if let Some(err) = self.artifacts.last_error() {
                ui.separator();
                ui.colored_label(ui.visuals().error_fg_color, err);
            }
        });
    }

    fn render_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = &self.alert else {
            return;
        };
        let mut dismissed = false;
        let modal = egui::Modal::new("alert_modal".into()).show(ctx, |ui| {
            ui.heading("Notice");
            ui.label(message.as_str());
            ui.separator();
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });
        if dismissed || modal.should_close() {
            self.alert = None;
        }
    }

    fn render_shortcut_modal(&mut self, ctx: &egui::Context) {
        if self.shortcuts_modal_open
            && egui::Modal::new("shortcut_modal".into())
                .show(ctx, |ui| {
                    ui.heading("Keyboard Shortcuts");
                    ui.separator();
                    ui.label("CTRL + O = Open CSV File");
                    ui.separator();
                    ui.label("CTRL + G = Generate Random Data");
                    ui.separator();
                    ui.label("F1 = Show Keyboard Shortcuts");
                    ui.separator();
                    ui.label("F3 = Cycle View");
                    ui.separator();
                    ui.label("F10 = Quit App");
                    ui.separator();
                    ui.label("F12 = Open Preferences");
                    ui.separator();
                })
                .should_close()
        {
            self.shortcuts_modal_open = false;
        };
    }
}
