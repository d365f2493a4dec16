use egui_extras::{Column, TableBuilder};
use table_io::Table;

use crate::app::{
    events::{EventQueue, ExportSource, ExportTableRequested},
    EguiApp,
};

const ROW_HEIGHT: f32 = 18.0;

/// Shows `table` with its row keys in the first column.
pub fn render_table(table: &Table, id_salt: &str, max_height: f32, ui: &mut egui::Ui) {
    if table.columns().is_empty() {
        ui.label("Empty table.");
        return;
    }
    ui.push_id(id_salt, |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(30.0))
            .columns(Column::auto().at_least(60.0), table.columns().len())
            .max_scroll_height(max_height)
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                for col in table.columns() {
                    header.col(|ui| {
                        ui.strong(col.as_str());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.len(), |mut row| {
                    let Some(data) = table.rows().get(row.index()) else {
                        return;
                    };
                    row.col(|ui| {
                        ui.label(data.key().to_string());
                    });
                    for i in 0..table.columns().len() {
                        row.col(|ui| {
                            ui.label(data.text(i).as_ref());
                        });
                    }
                });
            });
    });
}

/// Button that asks for a path and writes the table of `source` there.
pub fn export_button(
    source: ExportSource,
    file_name: &'static str,
    event_queue: &mut EventQueue<EguiApp>,
    ui: &mut egui::Ui,
) {
    if ui.button("Export CSV").clicked() {
        log::debug!("open dialog to select export path");
        let handle = std::thread::spawn(move || {
            rfd::FileDialog::new()
                .add_filter("CSV", &["csv"])
                .set_file_name(file_name)
                .save_file()
        });
        let event = ExportTableRequested::new(source, Some(handle));
        event_queue.queue_event(Box::new(event));
    }
}
