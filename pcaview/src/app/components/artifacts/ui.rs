use egui::{Align2, Color32};
use egui_plot::{Bar, BarChart, Legend, Line, LineStyle, Plot, PlotPoint, Points, Text, VLine};

use super::{ArtifactKind, Projection};
use crate::{
    app::{
        common::{auto_color, marker_color},
        components::table_view::{export_button, render_table},
        events::{EventQueue, ExportSource},
        EguiApp,
    },
    state::{
        artifact::PcaDim,
        payload::{axis_title, categories, PlotPayload, Series, TopContributors},
    },
};

const PLOT_HEIGHT: f32 = 400.0;
const TABLE_HEIGHT: f32 = 300.0;
// Radians per dragged pixel.
const ROTATION_SPEED: f64 = 0.01;

impl super::Artifacts {
    pub fn render(
        &mut self,
        event_queue: &mut EventQueue<EguiApp>,
        default_color: Color32,
        ui: &mut egui::Ui,
    ) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            for kind in ArtifactKind::ALL {
                if self.is_kind_loading(kind) {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(format!("Computing {kind} …"));
                    });
                }
            }
            if !ArtifactKind::ALL.iter().any(|kind| self.is_visible(*kind)) {
                ui.weak("Show an analysis from the toolbar above.");
            }

            if let Some(payload) = self.scree.visible_payload() {
                ui.heading(ArtifactKind::Scree.label());
                scree_plot(payload, ui);
                ui.separator();
            }
            if let Some(payload) = self.pca.two_d.visible_payload() {
                ui.heading(ArtifactKind::Pca(PcaDim::Two).label());
                pca_plot(payload, default_color, ui);
                ui.separator();
            }
            if let Some(payload) = self.pca.three_d.visible_payload() {
                ui.heading(ArtifactKind::Pca(PcaDim::Three).label());
                pca_3d_plot(payload, &mut self.projection, default_color, ui);
                ui.separator();
            }
            if let Some(table) = self.loadings.visible_payload() {
                ui.horizontal(|ui| {
                    ui.heading(ArtifactKind::Loadings.label());
                    export_button(ExportSource::Loadings, "loadings.csv", event_queue, ui);
                });
                render_table(table, "loadings_table", TABLE_HEIGHT, ui);
                ui.separator();
            }
            if let Some(answer) = self.contributors.visible_payload() {
                ui.horizontal(|ui| {
                    ui.heading(ArtifactKind::Contributors.label());
                    export_button(
                        ExportSource::Contributors,
                        "top_contributors.csv",
                        event_queue,
                        ui,
                    );
                });
                render_table(
                    &answer.top_five_contributors,
                    "contributors_table",
                    TABLE_HEIGHT,
                    ui,
                );
                contributors_plot(answer, ui);
            }
        });
    }
}

/// 2D plot with the axis titles given by the service.
fn titled_plot(
    id: &str,
    height: Option<f32>,
    x_title: Option<String>,
    y_title: Option<String>,
    show_legend: bool,
    add_contents: impl FnOnce(&mut egui_plot::PlotUi),
    ui: &mut egui::Ui,
) {
    let mut plot = Plot::new(id)
        .height(height.unwrap_or(PLOT_HEIGHT))
        .allow_scroll(false);
    if show_legend {
        plot = plot.legend(Legend::default());
    }
    if let Some(title) = x_title {
        plot = plot.x_axis_label(title);
    }
    if let Some(title) = y_title {
        plot = plot.y_axis_label(title);
    }
    plot.show(ui, add_contents);
}

/// Category labels under the x axis.
fn category_labels(plot_ui: &mut egui_plot::PlotUi, categories: &[String], y: f64) {
    for (i, label) in categories.iter().enumerate() {
        plot_ui.text(
            Text::new(PlotPoint::new(i as f64, y), label.as_str())
                .anchor(Align2::CENTER_TOP)
                .color(Color32::GRAY),
        );
    }
}

fn scree_plot(payload: &PlotPayload, ui: &mut egui::Ui) {
    let cats = categories(payload.data.iter());
    titled_plot(
        "scree_plot",
        payload.height(),
        payload.axis_title("xaxis"),
        payload.axis_title("yaxis"),
        payload.show_legend(),
        |plot_ui| {
            for (i, series) in payload.data.iter().enumerate() {
                let color = marker_color(series.marker_color(), auto_color(i));
                let points = series.points(&cats);
                if series.is_bar() {
                    let bars = points
                        .iter()
                        .map(|[x, y]| Bar::new(*x, *y).width(0.6))
                        .collect();
                    plot_ui.bar_chart(BarChart::new(bars).color(color).name(series.label()));
                } else {
                    plot_ui.line(Line::new(points.clone()).color(color).name(series.label()));
                    plot_ui.points(Points::new(points).color(color).radius(3.0));
                }
            }
            for marker in payload.vertical_markers() {
                let x = marker.position(0, &cats).unwrap_or_default();
                plot_ui.vline(
                    VLine::new(x)
                        .style(LineStyle::dashed_loose())
                        .color(Color32::GRAY),
                );
            }
            category_labels(plot_ui, &cats, 0.0);
        },
        ui,
    );
}

// Color and radius of a series' markers.
fn marker_style(series: &Series, default_color: Color32) -> (Color32, f32) {
    let radius = series
        .marker_size()
        .map(|size| size as f32 / 2.0)
        .unwrap_or(5.0);
    (marker_color(series.marker_color(), default_color), radius)
}

fn pca_plot(payload: &PlotPayload, default_color: Color32, ui: &mut egui::Ui) {
    let cats = categories(payload.data.iter());
    titled_plot(
        "pca_plot",
        payload.height(),
        payload.axis_title("xaxis"),
        payload.axis_title("yaxis"),
        payload.show_legend(),
        |plot_ui| {
            for series in payload.data.iter() {
                let (color, radius) = marker_style(series, default_color);
                plot_ui.points(
                    Points::new(series.points(&cats))
                        .color(color)
                        .radius(radius)
                        .filled(true)
                        .name(series.label()),
                );
            }
        },
        ui,
    );
}

fn pca_3d_plot(
    payload: &PlotPayload,
    projection: &mut Projection,
    default_color: Color32,
    ui: &mut egui::Ui,
) {
    ui.horizontal(|ui| {
        let mut yaw = projection.yaw.to_degrees();
        let mut pitch = projection.pitch.to_degrees();
        ui.label("Yaw");
        let yaw_changed = ui
            .add(egui::DragValue::new(&mut yaw).speed(1.0).suffix("°"))
            .changed();
        ui.label("Pitch");
        let pitch_changed = ui
            .add(
                egui::DragValue::new(&mut pitch)
                    .speed(1.0)
                    .range(-90.0..=90.0)
                    .suffix("°"),
            )
            .changed();
        if yaw_changed || pitch_changed {
            projection.yaw = yaw.to_radians();
            projection.pitch = pitch.to_radians();
            projection.rotate(0.0, 0.0);
        }
        if ui.button("Reset view").clicked() {
            *projection = Projection::default();
        }
        ui.weak("Drag the plot to rotate.");
    });

    let extent = payload
        .data
        .iter()
        .flat_map(|series| series.points_3d())
        .flat_map(|point| point.into_iter())
        .fold(1.0_f64, |acc, coord| acc.max(coord.abs()));
    let axes = [
        ([extent, 0.0, 0.0], payload.scene_axis_title("xaxis").unwrap_or("x".into())),
        ([0.0, extent, 0.0], payload.scene_axis_title("yaxis").unwrap_or("y".into())),
        ([0.0, 0.0, extent], payload.scene_axis_title("zaxis").unwrap_or("z".into())),
    ];

    let view = *projection;
    let response = Plot::new("pca_3d_plot")
        .legend(Legend::default())
        .height(payload.height().unwrap_or(PLOT_HEIGHT))
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (end, title) in axes.iter() {
                let start = end.map(|coord| -coord);
                plot_ui.line(
                    Line::new(vec![view.project(start), view.project(*end)])
                        .color(Color32::GRAY)
                        .style(LineStyle::dashed_dense()),
                );
                let [x, y] = view.project(*end);
                plot_ui.text(
                    Text::new(PlotPoint::new(x, y), title.as_str())
                        .anchor(Align2::LEFT_BOTTOM)
                        .color(Color32::GRAY),
                );
            }
            for series in payload.data.iter() {
                let points: Vec<[f64; 2]> = series
                    .points_3d()
                    .into_iter()
                    .map(|point| view.project(point))
                    .collect();
                let (color, radius) = marker_style(series, default_color);
                plot_ui.points(
                    Points::new(points)
                        .color(color)
                        .radius(radius)
                        .filled(true)
                        .name(series.label()),
                );
            }
        });
    if response.response.dragged() {
        let delta = response.response.drag_delta();
        projection.rotate(
            -delta.x as f64 * ROTATION_SPEED,
            delta.y as f64 * ROTATION_SPEED,
        );
    }
}

fn contributors_plot(answer: &TopContributors, ui: &mut egui::Ui) {
    let cats = categories(answer.loadings_plot_coordinates.iter());
    let ymin = answer
        .loadings_plot_coordinates
        .iter()
        .flat_map(|series| series.y.iter().copied())
        .fold(0.0_f64, f64::min);
    titled_plot(
        "contributors_plot",
        None,
        axis_title(&answer.layout, "xaxis"),
        axis_title(&answer.layout, "yaxis"),
        false,
        |plot_ui| {
            for (i, series) in answer.loadings_plot_coordinates.iter().enumerate() {
                let color = marker_color(series.marker_color(), auto_color(i));
                let points = series.points(&cats);
                let labels = series.text.iter().flatten();
                for ([x, y], label) in points.iter().zip(labels) {
                    plot_ui.text(
                        Text::new(PlotPoint::new(*x + 0.05, *y), label.as_str())
                            .anchor(Align2::LEFT_CENTER)
                            .color(color),
                    );
                }
                let (color, radius) = marker_style(series, color);
                plot_ui.points(Points::new(points).color(color).radius(radius));
            }
            category_labels(plot_ui, &cats, ymin);
        },
        ui,
    );
}
