use crate::app::{
    components::table_view::{export_button, render_table},
    events::{EventQueue, ExportSource},
    EguiApp,
};

impl super::Dataset {
    pub fn render(&mut self, event_queue: &mut EventQueue<EguiApp>, ui: &mut egui::Ui) {
        if self.is_loading() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading dataset …");
            });
        }
        if let Some(err) = self.last_error() {
            ui.colored_label(ui.visuals().error_fg_color, err);
        }
        let Some(table) = self.current() else {
            ui.label("No data loaded. Open a CSV file or generate random data from the File menu.");
            return;
        };
        ui.horizontal(|ui| {
            ui.heading(self.source());
            export_button(ExportSource::Data, "data.csv", event_queue, ui);
        });
        ui.label(format!("Number of samples: {}", table.len()));
        ui.separator();
        let max_height = ui.available_height();
        render_table(table, "data_table", max_height, ui);
    }
}
