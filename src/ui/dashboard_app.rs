use std::{
    path::PathBuf,
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
    thread,
};

use egui::{Color32, RichText};
use log::{error, info};

use crate::{
    api::TelemetryBackend,
    config::AppConfig,
    dashboard::{Action, DashboardState, Effect, MainView, execute},
    live::LiveSession,
};

use super::{LiveSource, dashboard_visuals, spawn_live_feed};

const MAX_ACTIONS_PER_FRAME: usize = 32;

/// The dashboard window.
///
/// Views push `Action`s. Backend requests run on worker threads and report back through
/// `action_receiver`.
pub struct DashboardApp {
    pub(crate) state: DashboardState,
    backend: Arc<dyn TelemetryBackend + Send + Sync>,
    action_sender: Sender<Action>,
    action_receiver: Receiver<Action>,
    pub(crate) live: Option<LiveSession>,
    pub(crate) live_source: Option<LiveSource>,
    live_output: Option<PathBuf>,
    pub(crate) app_config: AppConfig,
    pub(crate) filter_text: [String; 3],
}

impl DashboardApp {
    pub fn new(
        backend: Arc<dyn TelemetryBackend + Send + Sync>,
        app_config: AppConfig,
        live_source: Option<LiveSource>,
        live_output: Option<PathBuf>,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        cc.egui_ctx.set_visuals(dashboard_visuals());
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let (action_sender, action_receiver) = mpsc::channel();
        let mut app = Self {
            state: DashboardState::with_filters(app_config.filters.clone()),
            backend,
            action_sender,
            action_receiver,
            live: None,
            live_source,
            live_output,
            app_config,
            filter_text: Default::default(),
        };

        app.sync_filter_text();
        app.dispatch(Action::Refresh);
        if app.live_source.is_some() {
            app.dispatch(Action::StartLive);
        }
        app
    }

    pub(crate) fn dispatch(&mut self, action: Action) {
        let options_loaded = matches!(action, Action::FilterOptionsLoaded(_));
        for effect in self.state.apply(action) {
            match effect {
                Effect::StartLive => self.start_live(),
                Effect::StopLive => self.stop_live(),
                effect => self.spawn_request(effect),
            }
        }
        if options_loaded {
            self.sync_filter_text();
        }
    }

    fn spawn_request(&self, effect: Effect) {
        let backend = Arc::clone(&self.backend);
        let sender = self.action_sender.clone();
        thread::spawn(move || {
            if let Some(result) = execute(backend.as_ref(), &effect) {
                // the window may already be closed
                let _ = sender.send(result);
            }
        });
    }

    fn start_live(&mut self) {
        let Some(source) = self.live_source.clone() else {
            info!("No live source selected, waiting for one");
            return;
        };
        let feed = spawn_live_feed(
            &source,
            self.live_output.clone(),
            self.app_config.refresh_rate_ms,
        );
        self.live = Some(LiveSession::new(feed, self.app_config.live_capacity));
    }

    fn stop_live(&mut self) {
        if let Some(mut live) = self.live.take() {
            live.stop();
        }
    }

    /// Pick a replay file and run live mode from it.
    pub(crate) fn choose_replay(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON Lines", &["jsonl", "json"])
            .pick_file()
        {
            self.live_source = Some(LiveSource::Replay { path, looped: true });
            self.dispatch(Action::StopLive);
            self.dispatch(Action::StartLive);
        }
    }

    fn drain_actions(&mut self) {
        for _ in 0..MAX_ACTIONS_PER_FRAME {
            match self.action_receiver.try_recv() {
                Ok(action) => self.dispatch(action),
                Err(_) => break,
            }
        }
    }

    fn main_view(&self) -> MainView {
        let live_has_data = self.live.as_ref().is_some_and(LiveSession::has_data);
        self.state.main_view(live_has_data)
    }

    fn header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(RichText::new("Pitwall Telemetry").color(Color32::WHITE));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if self.state.live_mode {
                    if ui.button("⏹ Stop live mode").clicked() {
                        self.dispatch(Action::StopLive);
                    }
                } else if ui.button("🔴 Start live mode").clicked() {
                    self.dispatch(Action::StartLive);
                }
                if ui.button("📂 Replay file").clicked() {
                    self.choose_replay();
                }
                if ui.button("⟳ Refresh").clicked() {
                    self.dispatch(Action::Refresh);
                }
            });
        });
        if let Some(error) = &self.state.last_error {
            ui.colored_label(Color32::LIGHT_RED, error.as_str());
        }
    }
}

impl eframe::App for DashboardApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.stop_live();
        if let Err(e) = AppConfig::save_filters(&self.state.filters) {
            error!("Error while saving config file: {}", e);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_actions();
        if let Some(live) = self.live.as_mut() {
            live.pump();
        }

        egui::TopBottomPanel::top("header")
            .min_height(30.)
            .show(ctx, |ui| self.header(ui));

        egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(280.)
            .show(ctx, |ui| self.sidebar(ui));

        egui::CentralPanel::default().show(ctx, |ui| match self.main_view() {
            MainView::Live => self.live_view(ui),
            MainView::SessionAnalysis => self.analysis_view(ui),
            MainView::Welcome => self.welcome_view(ui),
        });

        // keep polling the feed and the worker threads
        ctx.request_repaint_after(std::time::Duration::from_millis(
            self.app_config.refresh_rate_ms,
        ));
    }
}
