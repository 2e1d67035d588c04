use egui::{Color32, RichText, Ui, Vec2b};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, PlotPoints, Points};

use crate::{
    api::{Lap, RecordId, SessionAnalysis, SessionSummary},
    dashboard::{
        Action, ComparisonState, Tab,
        charts::{
            LapTimeSeries, SectorBars, comparison_rows, lap_rows, sector_details, sector_leaders,
        },
        format::{
            format_consistency, format_datetime, format_humidity, format_lap_time,
            format_laps_count, format_temperature,
        },
    },
};

use super::{BRAKE_COLOR, DashboardApp, LAP_TIME_COLOR, PALETTE_ORANGE, SPEED_COLOR};

const CHART_HEIGHT: f32 = 260.;

fn stat_row(ui: &mut Ui, label: &str, value: String) {
    ui.label(RichText::new(label).color(Color32::LIGHT_GRAY));
    ui.label(RichText::new(value).strong().color(Color32::WHITE));
    ui.end_row();
}

fn priority_color(priority: &str) -> Color32 {
    match priority {
        "high" => BRAKE_COLOR,
        "medium" => PALETTE_ORANGE,
        _ => SPEED_COLOR,
    }
}

impl DashboardApp {
    pub(crate) fn welcome_view(&mut self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(80.);
            ui.heading(RichText::new("Welcome to Pitwall").size(28.).color(Color32::WHITE));
            ui.add_space(10.);
            ui.label("Pick a session on the left to analyse it, or start live mode to watch");
            ui.label("speed and pedal inputs as they come in.");
            ui.add_space(20.);
            if self.live_source.is_none() {
                ui.label(RichText::new("No live source configured").small());
                if ui.button("📂 Open a replay file").clicked() {
                    self.choose_replay();
                }
            } else if self.state.live_mode {
                ui.label(RichText::new("Waiting for telemetry...").italics());
            }
        });
    }

    pub(crate) fn analysis_view(&mut self, ui: &mut Ui) {
        let Some(session) = self.state.selected_session.clone() else {
            return;
        };
        session_header(ui, &session);
        ui.separator();

        let mut tab = self.state.active_tab;
        ui.horizontal(|ui| {
            ui.selectable_value(&mut tab, Tab::Overview, "Overview");
            ui.selectable_value(&mut tab, Tab::Laps, "Laps");
            ui.selectable_value(&mut tab, Tab::Sectors, "Sectors");
            ui.selectable_value(&mut tab, Tab::Comparison, "Comparison");
        });
        if tab != self.state.active_tab {
            self.dispatch(Action::SelectTab(tab));
        }
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| match self.state.active_tab {
            Tab::Overview => overview_tab(ui, &session, self.state.analysis.as_ref()),
            Tab::Laps => self.laps_tab(ui),
            Tab::Sectors => sectors_tab(ui, self.state.analysis.as_ref()),
            Tab::Comparison => self.comparison_tab(ui),
        });
    }

    fn laps_tab(&mut self, ui: &mut Ui) {
        if self.state.laps.is_empty() {
            ui.label("No laps recorded for this session");
            return;
        }
        lap_time_chart(ui, &self.state.laps);

        ui.add_space(10.);
        ui.label(RichText::new("Select two or more laps to compare them").small());

        let ids: Vec<RecordId> = self.state.laps.iter().map(|lap| lap.id.clone()).collect();
        let rows = lap_rows(&self.state.laps, &self.state.selected_laps);
        let mut toggled = None;

        TableBuilder::new(ui)
            .id_salt("laps_table")
            .vscroll(false)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::exact(24.))
            .column(Column::auto().at_least(36.))
            .columns(Column::auto().at_least(80.), 5)
            .column(Column::remainder())
            .header(20., |mut header| {
                for title in [
                    "", "Lap", "Time", "Sector 1", "Sector 2", "Sector 3", "Top speed", "",
                ] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for (row, id) in rows.iter().zip(ids) {
                    body.row(20., |mut table_row| {
                        table_row.col(|ui| {
                            let mut checked = row.is_selected;
                            if ui.checkbox(&mut checked, "").changed() {
                                toggled = Some(id);
                            }
                        });
                        table_row.col(|ui| {
                            ui.label(row.lap_number.to_string());
                        });
                        table_row.col(|ui| {
                            let time = RichText::new(&row.lap_time);
                            ui.label(if row.is_personal_best {
                                time.strong().color(PALETTE_ORANGE)
                            } else {
                                time
                            });
                        });
                        for sector in &row.sectors {
                            table_row.col(|ui| {
                                ui.label(sector);
                            });
                        }
                        table_row.col(|ui| {
                            ui.label(&row.top_speed);
                        });
                        table_row.col(|ui| {
                            if row.is_personal_best {
                                ui.label(RichText::new("PB").color(PALETTE_ORANGE));
                            }
                            if !row.is_valid {
                                ui.label(RichText::new("INVALID").color(BRAKE_COLOR));
                            }
                        });
                    });
                }
            });

        if let Some(lap_id) = toggled {
            self.dispatch(Action::ToggleLap(lap_id));
        }
    }

    fn comparison_tab(&mut self, ui: &mut Ui) {
        let comparison = match &self.state.comparison {
            ComparisonState::NeedsMoreLaps => {
                ui.label("Select at least two laps in the Laps tab to compare them");
                return;
            }
            ComparisonState::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Comparing laps...");
                });
                return;
            }
            ComparisonState::Failed(message) => {
                ui.colored_label(Color32::LIGHT_RED, format!("Comparison failed: {}", message));
                return;
            }
            ComparisonState::Ready(comparison) => comparison,
        };

        egui::Grid::new("comparison_table")
            .striped(true)
            .num_columns(7)
            .spacing([16., 4.])
            .show(ui, |ui| {
                for header in [
                    "Driver", "Lap", "Time", "Sector 1", "Sector 2", "Sector 3", "Top speed",
                ] {
                    ui.label(RichText::new(header).strong());
                }
                ui.end_row();

                for row in comparison_rows(comparison) {
                    let username = RichText::new(&row.username);
                    ui.label(if row.is_fastest {
                        username.strong().color(PALETTE_ORANGE)
                    } else {
                        username
                    });
                    ui.label(row.lap_number.to_string());
                    ui.label(&row.lap_time);
                    for sector in &row.sectors {
                        ui.label(sector);
                    }
                    ui.label(&row.top_speed);
                    ui.end_row();
                }
            });

        let leaders = sector_leaders(comparison);
        if !leaders.is_empty() {
            ui.add_space(10.);
            ui.label(RichText::new("Fastest per sector").strong());
            egui::Grid::new("sector_leaders").striped(true).show(ui, |ui| {
                for (sector, username, time) in leaders {
                    ui.label(sector);
                    ui.label(username);
                    ui.label(time);
                    ui.end_row();
                }
            });
        }
    }
}

fn session_header(ui: &mut Ui, session: &SessionSummary) {
    ui.heading(RichText::new(&session.session_name).color(Color32::WHITE));
    ui.horizontal(|ui| {
        ui.label(format!("{} · {}", session.game_name(), session.track_name()));
        if let Some(car) = &session.car {
            ui.label(format!("· {}", car.name));
        }
        ui.label(format!("· {}", format_datetime(session.created_at.as_deref())));
    });
}

fn overview_tab(ui: &mut Ui, session: &SessionSummary, analysis: Option<&SessionAnalysis>) {
    ui.columns(2, |columns| {
        columns[0].label(RichText::new("Statistics").strong());
        egui::Grid::new("session_statistics")
            .num_columns(2)
            .show(&mut columns[0], |ui| {
                let stats = analysis.map(|a| &a.statistics);
                stat_row(
                    ui,
                    "Best lap",
                    format_lap_time(stats.and_then(|s| s.best_lap_time).or(session.best_lap_time)),
                );
                stat_row(
                    ui,
                    "Average lap",
                    format_lap_time(stats.and_then(|s| s.average_lap_time)),
                );
                stat_row(
                    ui,
                    "Laps",
                    format_laps_count(session.valid_laps, session.total_laps),
                );
                stat_row(
                    ui,
                    "Consistency",
                    format_consistency(stats.and_then(|s| s.average_consistency)),
                );
            });

        columns[1].label(RichText::new("Conditions").strong());
        egui::Grid::new("session_conditions")
            .num_columns(2)
            .show(&mut columns[1], |ui| {
                stat_row(
                    ui,
                    "Weather",
                    session
                        .weather_condition
                        .clone()
                        .unwrap_or_else(|| "N/A".to_string()),
                );
                stat_row(ui, "Track", format_temperature(session.track_temperature));
                stat_row(ui, "Air", format_temperature(session.air_temperature));
                stat_row(ui, "Humidity", format_humidity(session.humidity));
            });
    });

    let Some(analysis) = analysis else {
        return;
    };
    if analysis.recommendations.is_empty() {
        return;
    }
    ui.add_space(10.);
    ui.label(RichText::new("Recommendations").strong());
    for recommendation in &analysis.recommendations {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(recommendation.priority.to_uppercase())
                        .small()
                        .color(priority_color(&recommendation.priority)),
                );
                ui.label(RichText::new(&recommendation.kind).small());
            });
            ui.label(&recommendation.message);
        });
    }
}

fn lap_time_chart(ui: &mut Ui, laps: &[Lap]) {
    let series = LapTimeSeries::from_laps(laps);
    egui_plot::Plot::new("lap_times")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .auto_bounds(Vec2b::new(true, true))
        .y_axis_formatter(|mark, _range| format_lap_time(Some(mark.value)))
        .label_formatter(|_name, point| {
            format!("Lap {}: {}", point.x.round(), format_lap_time(Some(point.y)))
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new("Lap time", PlotPoints::new(series.lap_times)).color(LAP_TIME_COLOR),
            );
            plot_ui.points(
                Points::new("Personal best", PlotPoints::new(series.personal_bests))
                    .color(PALETTE_ORANGE)
                    .radius(6.),
            );
        });
}

fn sectors_tab(ui: &mut Ui, analysis: Option<&SessionAnalysis>) {
    let Some(bars) = analysis.and_then(SectorBars::from_analysis) else {
        ui.label("No sector data for this session");
        return;
    };

    let best = BarChart::new(
        "Best",
        bars.best
            .iter()
            .enumerate()
            .map(|(idx, time)| Bar::new(idx as f64 + 0.8, *time).width(0.35))
            .collect(),
    )
    .color(SPEED_COLOR);
    let average = BarChart::new(
        "Average",
        bars.average
            .iter()
            .enumerate()
            .map(|(idx, time)| Bar::new(idx as f64 + 1.2, *time).width(0.35))
            .collect(),
    )
    .color(LAP_TIME_COLOR);

    egui_plot::Plot::new("sector_times")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .include_y(0.)
        .x_axis_formatter(|mark, _range| {
            let sector = mark.value.round();
            if (mark.value - sector).abs() < f64::EPSILON && (1. ..=3.).contains(&sector) {
                format!("Sector {}", sector)
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(best);
            plot_ui.bar_chart(average);
        });

    if let Some(analysis) = analysis {
        ui.add_space(10.);
        egui::Grid::new("sector_details")
            .striped(true)
            .num_columns(4)
            .spacing([16., 4.])
            .show(ui, |ui| {
                for header in ["Sector", "Best", "Average", "Worst"] {
                    ui.label(RichText::new(header).strong());
                }
                ui.end_row();
                for row in sector_details(analysis) {
                    ui.label(row.label);
                    ui.label(row.best);
                    ui.label(row.average);
                    ui.label(row.worst);
                    ui.end_row();
                }
            });
    }
}
