use std::sync::Arc;

use egui::{Color32, RichText, Ui, Vec2b};
use egui_plot::{Legend, Line, PlotPoints};

use crate::live::{LiveReadout, LiveSeries};

use super::{
    BRAKE_COLOR, DashboardApp, PALETTE_ORANGE, SPEED_COLOR, THROTTLE_COLOR, stroke_shade,
};

const CHART_HEIGHT: f32 = 220.;

fn stat_card(ui: &mut Ui, value: &str, label: &str) {
    ui.group(|ui| {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(value).size(24.).strong().color(Color32::WHITE));
            ui.label(RichText::new(label).small());
        });
    });
}

impl DashboardApp {
    pub(crate) fn live_view(&mut self, ui: &mut Ui) {
        let Some(live) = self.live.as_ref() else {
            return;
        };
        let readout: LiveReadout = live.readout();
        let series: LiveSeries = live.series();
        let window = live.buffer().capacity() as f64;
        let connected = live.is_connected();

        ui.horizontal(|ui| {
            ui.heading("Live telemetry");
            if !connected {
                ui.colored_label(Color32::YELLOW, "feed ended");
            }
        });

        ui.horizontal(|ui| {
            stat_card(ui, &readout.speed, "km/h");
            stat_card(ui, &readout.throttle, "% throttle");
            stat_card(ui, &readout.brake, "% brake");
            stat_card(ui, &readout.gear, "gear");
            stat_card(ui, &readout.rpm, "RPM");
        });

        ui.label(RichText::new("Speed").strong());
        egui_plot::Plot::new("live_speed")
            .height(CHART_HEIGHT)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .include_x(0.)
            .include_x(window)
            .include_y(0.)
            .auto_bounds(Vec2b::new(false, true))
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new("Speed (km/h)", PlotPoints::new(series.speed))
                        .color(SPEED_COLOR)
                        .fill(0.),
                );
            });

        ui.label(RichText::new("Inputs").strong());
        egui_plot::Plot::new("live_inputs")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .include_x(0.)
            .include_x(window)
            .include_y(0.)
            .include_y(100.)
            .auto_bounds(Vec2b::new(false, false))
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new("Throttle (%)", PlotPoints::new(series.throttle))
                        .color(THROTTLE_COLOR)
                        .fill(0.),
                );
                plot_ui.line(
                    Line::new("Brake (%)", PlotPoints::new(series.brake))
                        .gradient_color(
                            Arc::new(|point| {
                                stroke_shade(PALETTE_ORANGE, BRAKE_COLOR, (point.y / 100.) as f32)
                            }),
                            true,
                        )
                        .color(BRAKE_COLOR)
                        .fill(0.),
                );
            });
    }
}
