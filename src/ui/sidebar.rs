use egui::{Color32, RichText, Ui};
use egui_dropdown::DropDownBox;
use itertools::Itertools;

use crate::{
    api::{NamedRef, Weather},
    dashboard::{
        Action, FilterField,
        format::{format_date, format_lap_time, format_laps_count},
    },
};

use super::{DashboardApp, PALETTE_ORANGE};

/// Map the text typed in a filter box to a filter value: empty text clears the filter,
/// a known name selects its id, anything else leaves the filter alone.
pub(crate) fn resolve_filter(text: &str, options: &[NamedRef]) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return Some(String::new());
    }
    options
        .iter()
        .find(|option| option.name.eq_ignore_ascii_case(text))
        .map(|option| option.id.to_string())
}

/// Text to show in a filter box for the active filter `value`: the matching option's
/// name, or the raw value when no option has that id.
pub(crate) fn filter_label(value: &str, options: &[NamedRef]) -> String {
    if value.is_empty() {
        return String::new();
    }
    options
        .iter()
        .find(|option| option.id.to_string() == value)
        .map(|option| option.name.clone())
        .unwrap_or_else(|| value.to_string())
}

impl DashboardApp {
    /// Show the active game, car and track filters in their boxes.
    pub(crate) fn sync_filter_text(&mut self) {
        let options = &self.state.filter_options;
        let filters = &self.state.filters;
        self.filter_text = [
            filter_label(&filters.game, &options.games),
            filter_label(&filters.car, &options.cars),
            filter_label(&filters.track, &options.tracks),
        ];
    }

    pub(crate) fn sidebar(&mut self, ui: &mut Ui) {
        ui.heading("Filters");
        self.filter_box(ui, FilterField::Game, "Game");
        self.filter_box(ui, FilterField::Car, "Car");
        self.filter_box(ui, FilterField::Track, "Track");
        self.weather_box(ui);

        ui.separator();
        self.session_list(ui);
    }

    fn filter_box(&mut self, ui: &mut Ui, field: FilterField, label: &str) {
        let (slot, options) = match field {
            FilterField::Game => (0, &self.state.filter_options.games),
            FilterField::Car => (1, &self.state.filter_options.cars),
            FilterField::Track => (2, &self.state.filter_options.tracks),
            FilterField::Weather => return,
        };
        let names = options.iter().map(|o| o.name.clone()).collect_vec();
        let previous_text = self.filter_text[slot].clone();

        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("{}: ", label)).color(Color32::WHITE));
            ui.add(
                DropDownBox::from_iter(
                    names,
                    format!("{}_dropbox", label.to_lowercase()),
                    &mut self.filter_text[slot],
                    |ui, text| ui.selectable_label(false, text),
                )
                .filter_by_input(true),
            );
        });

        if previous_text == self.filter_text[slot] {
            return;
        }
        if let Some(value) = resolve_filter(&self.filter_text[slot], options) {
            self.dispatch(Action::SetFilter(field, value));
        }
    }

    fn weather_box(&mut self, ui: &mut Ui) {
        let mut weather = self.state.filters.weather.clone();
        ui.horizontal(|ui| {
            ui.label(RichText::new("Weather: ").color(Color32::WHITE));
            egui::ComboBox::from_id_salt("weather_combo")
                .selected_text(if weather.is_empty() {
                    "Any"
                } else {
                    weather.as_str()
                })
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut weather, String::new(), "Any");
                    for option in Weather::ALL {
                        ui.selectable_value(
                            &mut weather,
                            option.as_str().to_string(),
                            option.as_str(),
                        );
                    }
                });
        });
        self.dispatch(Action::SetFilter(FilterField::Weather, weather));
    }

    fn session_list(&mut self, ui: &mut Ui) {
        ui.heading("Recent sessions");
        let selected_id = self.state.selected_session.as_ref().map(|s| s.id.clone());
        let mut clicked = None;

        egui::ScrollArea::vertical().show(ui, |ui| {
            for session in &self.state.sessions {
                let is_selected = selected_id.as_ref() == Some(&session.id);
                let title = RichText::new(&session.session_name).strong().color(if is_selected {
                    PALETTE_ORANGE
                } else {
                    Color32::WHITE
                });

                let response = ui
                    .group(|ui| {
                        ui.horizontal(|ui| {
                            ui.label(title);
                            ui.label(format_date(session.created_at.as_deref()));
                        });
                        ui.horizontal(|ui| {
                            ui.label(format!("🏁 {}", format_lap_time(session.best_lap_time)));
                            ui.label(format!(
                                "📊 {}",
                                format_laps_count(session.valid_laps, session.total_laps)
                            ));
                        });
                        ui.label(
                            RichText::new(format!(
                                "{} {}",
                                session.game_name(),
                                session.track_name()
                            ))
                            .small(),
                        );
                    })
                    .response
                    .interact(egui::Sense::click());
                if response.clicked() {
                    clicked = Some(session.id.clone());
                }
            }
        });

        if let Some(session_id) = clicked {
            self.dispatch(Action::SelectSession(session_id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RecordId;

    fn tracks() -> Vec<NamedRef> {
        vec![
            NamedRef {
                id: RecordId::from(3),
                name: "Spa-Francorchamps".to_string(),
            },
            NamedRef {
                id: RecordId::from("monza"),
                name: "Monza".to_string(),
            },
        ]
    }

    #[test]
    fn test_resolve_filter() {
        assert_eq!(resolve_filter("", &tracks()), Some(String::new()));
        assert_eq!(resolve_filter("  ", &tracks()), Some(String::new()));
        assert_eq!(
            resolve_filter("spa-francorchamps", &tracks()),
            Some("3".to_string())
        );
        assert_eq!(resolve_filter("Monza", &tracks()), Some("monza".to_string()));
        // still typing
        assert_eq!(resolve_filter("Mon", &tracks()), None);
    }

    #[test]
    fn test_filter_label_shows_restored_filter() {
        assert_eq!(filter_label("3", &tracks()), "Spa-Francorchamps");
        assert_eq!(filter_label("monza", &tracks()), "Monza");
        assert_eq!(filter_label("", &tracks()), "");
        // options not loaded yet, or the track was removed
        assert_eq!(filter_label("3", &[]), "3");
    }

    #[test]
    fn test_restored_label_resolves_to_same_filter() {
        let label = filter_label("3", &tracks());
        assert_eq!(resolve_filter(&label, &tracks()), Some("3".to_string()));
    }
}
