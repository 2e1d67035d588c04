// Dashboard state with explicit, one-way updates.
//
// Views never mutate state directly: they send an `Action`, `DashboardState::apply`
// updates the state and returns the backend requests (`Effect`) that the caller has to
// run. Results come back as further actions.

pub mod charts;
pub mod format;

use std::sync::mpsc::Receiver;

use log::{debug, warn};

use crate::{
    PitwallError,
    api::{
        FilterOptions, Lap, LapComparison, RecordId, SessionAnalysis, SessionFilters,
        SessionSummary, TelemetryBackend, load_sessions,
    },
    live::LiveSession,
    telemetry::LiveOutput,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Overview,
    Laps,
    Sectors,
    Comparison,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterField {
    Game,
    Car,
    Track,
    Weather,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum ComparisonState {
    #[default]
    NeedsMoreLaps,
    Loading,
    Ready(LapComparison),
    Failed(String),
}

/// What the main panel shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MainView {
    Live,
    SessionAnalysis,
    Welcome,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Refresh,
    SetFilter(FilterField, String),
    SelectSession(RecordId),
    SelectTab(Tab),
    ToggleLap(RecordId),
    StartLive,
    StopLive,
    FilterOptionsLoaded(FilterOptions),
    SessionsLoaded {
        filters: SessionFilters,
        sessions: Vec<SessionSummary>,
    },
    SessionDetailLoaded {
        session_id: RecordId,
        laps: Vec<Lap>,
        analysis: Option<SessionAnalysis>,
    },
    ComparisonLoaded {
        lap_ids: Vec<RecordId>,
        comparison: LapComparison,
    },
    ComparisonFailed {
        lap_ids: Vec<RecordId>,
        message: String,
    },
    RequestFailed(String),
}

/// Requests produced by `apply`. None of them run implicitly.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadFilterOptions,
    LoadSessions(SessionFilters),
    LoadSessionDetail(RecordId),
    CompareLaps(Vec<RecordId>),
    StartLive,
    StopLive,
}

#[derive(Clone, Debug, Default)]
pub struct DashboardState {
    pub filters: SessionFilters,
    pub filter_options: FilterOptions,
    pub sessions: Vec<SessionSummary>,
    pub selected_session: Option<SessionSummary>,
    pub laps: Vec<Lap>,
    pub analysis: Option<SessionAnalysis>,
    pub selected_laps: Vec<RecordId>,
    pub active_tab: Tab,
    pub comparison: ComparisonState,
    pub live_mode: bool,
    pub last_error: Option<String>,
}

impl DashboardState {
    pub fn with_filters(filters: SessionFilters) -> Self {
        Self {
            filters,
            ..Default::default()
        }
    }

    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Refresh => vec![
                Effect::LoadFilterOptions,
                Effect::LoadSessions(self.filters.clone()),
            ],
            Action::SetFilter(field, value) => {
                let slot = match field {
                    FilterField::Game => &mut self.filters.game,
                    FilterField::Car => &mut self.filters.car,
                    FilterField::Track => &mut self.filters.track,
                    FilterField::Weather => &mut self.filters.weather,
                };
                if *slot == value {
                    return Vec::new();
                }
                *slot = value;
                vec![Effect::LoadSessions(self.filters.clone())]
            }
            Action::SelectSession(session_id) => {
                if self.selected_session.as_ref().map(|s| &s.id) == Some(&session_id) {
                    return Vec::new();
                }
                let Some(session) = self.sessions.iter().find(|s| s.id == session_id) else {
                    warn!("Ignoring selection of unknown session {}", session_id);
                    return Vec::new();
                };
                self.selected_session = Some(session.clone());
                self.laps.clear();
                self.analysis = None;
                self.selected_laps.clear();
                self.comparison = ComparisonState::NeedsMoreLaps;
                self.active_tab = Tab::Overview;
                vec![Effect::LoadSessionDetail(session_id)]
            }
            Action::SelectTab(tab) => {
                self.active_tab = tab;
                Vec::new()
            }
            Action::ToggleLap(lap_id) => {
                if let Some(pos) = self.selected_laps.iter().position(|id| *id == lap_id) {
                    self.selected_laps.remove(pos);
                } else {
                    self.selected_laps.push(lap_id);
                }

                if self.selected_laps.len() >= 2 {
                    self.comparison = ComparisonState::Loading;
                    vec![Effect::CompareLaps(self.selected_laps.clone())]
                } else {
                    self.comparison = ComparisonState::NeedsMoreLaps;
                    Vec::new()
                }
            }
            Action::StartLive => {
                if self.live_mode {
                    return Vec::new();
                }
                self.live_mode = true;
                vec![Effect::StartLive]
            }
            Action::StopLive => {
                if !self.live_mode {
                    return Vec::new();
                }
                self.live_mode = false;
                vec![Effect::StopLive]
            }
            Action::FilterOptionsLoaded(options) => {
                self.filter_options = options;
                Vec::new()
            }
            Action::SessionsLoaded { filters, sessions } => {
                if filters != self.filters {
                    debug!("Dropping {} sessions for outdated filters", sessions.len());
                    return Vec::new();
                }
                debug!("Loaded {} sessions", sessions.len());
                self.sessions = sessions;
                self.last_error = None;
                Vec::new()
            }
            Action::SessionDetailLoaded {
                session_id,
                laps,
                analysis,
            } => {
                if self.selected_session.as_ref().map(|s| &s.id) != Some(&session_id) {
                    debug!("Dropping stale detail for session {}", session_id);
                    return Vec::new();
                }
                self.laps = laps;
                self.analysis = analysis;
                Vec::new()
            }
            Action::ComparisonLoaded {
                lap_ids,
                comparison,
            } => {
                if lap_ids == self.selected_laps {
                    self.comparison = ComparisonState::Ready(comparison);
                }
                Vec::new()
            }
            Action::ComparisonFailed { lap_ids, message } => {
                if lap_ids == self.selected_laps {
                    self.comparison = ComparisonState::Failed(message);
                }
                Vec::new()
            }
            Action::RequestFailed(message) => {
                self.last_error = Some(message);
                Vec::new()
            }
        }
    }

    /// Live charts only show once live mode has data; otherwise the selected session,
    /// otherwise the welcome screen.
    pub fn main_view(&self, live_has_data: bool) -> MainView {
        if self.live_mode && live_has_data {
            MainView::Live
        } else if self.selected_session.is_some() {
            MainView::SessionAnalysis
        } else {
            MainView::Welcome
        }
    }
}

/// Run one backend request and turn its outcome into the action that reports it.
/// Live effects are not backend requests and return `None`.
pub fn execute(backend: &dyn TelemetryBackend, effect: &Effect) -> Option<Action> {
    let action = match effect {
        Effect::LoadFilterOptions => match backend.filter_options() {
            Ok(options) => Action::FilterOptionsLoaded(options),
            Err(e) => request_failed("Could not load filter options", &e),
        },
        Effect::LoadSessions(filters) => match load_sessions(backend, filters) {
            Ok(sessions) => Action::SessionsLoaded {
                filters: filters.clone(),
                sessions,
            },
            Err(e) => request_failed("Could not load sessions", &e),
        },
        Effect::LoadSessionDetail(session_id) => {
            let laps = backend.session_laps(session_id);
            let analysis = backend.session_analysis(session_id);
            match (laps, analysis) {
                (Err(e), Err(_)) => request_failed("Could not load session", &e),
                (laps, analysis) => Action::SessionDetailLoaded {
                    session_id: session_id.clone(),
                    laps: laps.unwrap_or_else(|e| {
                        warn!("Could not load laps of session {}: {}", session_id, e);
                        Vec::new()
                    }),
                    analysis: analysis
                        .map_err(|e| {
                            warn!("Could not load analysis of session {}: {}", session_id, e)
                        })
                        .ok(),
                },
            }
        }
        Effect::CompareLaps(lap_ids) => match backend.compare_laps(lap_ids) {
            Ok(comparison) => Action::ComparisonLoaded {
                lap_ids: lap_ids.clone(),
                comparison,
            },
            Err(e) => {
                warn!("Lap comparison failed: {}", e);
                Action::ComparisonFailed {
                    lap_ids: lap_ids.clone(),
                    message: e.to_string(),
                }
            }
        },
        Effect::StartLive | Effect::StopLive => return None,
    };
    Some(action)
}

fn request_failed(context: &str, error: &PitwallError) -> Action {
    warn!("{}: {}", context, error);
    Action::RequestFailed(format!("{}: {}", context, error))
}

/// Synchronous driver: state, live session and a backend, with effects run inline.
pub struct Dashboard<B: TelemetryBackend> {
    pub state: DashboardState,
    backend: B,
    live: Option<LiveSession>,
}

impl<B: TelemetryBackend> Dashboard<B> {
    pub fn new(backend: B, filters: SessionFilters) -> Self {
        Self {
            state: DashboardState::with_filters(filters),
            backend,
            live: None,
        }
    }

    /// Apply `action` and every action that results from it.
    pub fn dispatch(&mut self, action: Action) {
        let mut pending = vec![action];
        while let Some(action) = pending.pop() {
            for effect in self.state.apply(action) {
                match effect {
                    Effect::StopLive => self.drop_live(),
                    Effect::StartLive => {}
                    effect => pending.extend(execute(&self.backend, &effect)),
                }
            }
        }
    }

    /// Enter live mode fed by `feed`, replacing any running live session.
    pub fn start_live(&mut self, feed: Receiver<LiveOutput>, capacity: usize) {
        self.drop_live();
        self.live = Some(LiveSession::new(feed, capacity));
        self.dispatch(Action::StartLive);
    }

    pub fn stop_live(&mut self) {
        self.dispatch(Action::StopLive);
    }

    pub fn pump_live(&mut self) -> usize {
        self.live.as_mut().map(LiveSession::pump).unwrap_or(0)
    }

    pub fn live(&self) -> Option<&LiveSession> {
        self.live.as_ref()
    }

    pub fn main_view(&self) -> MainView {
        let live_has_data = self.live.as_ref().is_some_and(LiveSession::has_data);
        self.state.main_view(live_has_data)
    }

    fn drop_live(&mut self) {
        if let Some(mut live) = self.live.take() {
            live.stop();
        }
    }
}
