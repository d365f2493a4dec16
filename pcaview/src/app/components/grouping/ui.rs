use egui::RichText;

use crate::{
    app::{
        common::{color_to_hex, parse_color},
        events::{AddGroup, AssignSample, ChangeGroupColor, EventQueue, RemoveGroup, ResetGroups},
        EguiApp,
    },
    state::color_groups::ColorGroups,
};

impl super::GroupPanel {
    pub fn render(
        &mut self,
        groups: &ColorGroups,
        event_queue: &mut EventQueue<EguiApp>,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
    ) {
        self.render_reset_modal(event_queue, ctx);

        ui.heading("Groups");
        for (index, grp) in groups.groups().iter().enumerate() {
            ui.horizontal(|ui| {
                let mut color = parse_color(&grp.color_code).unwrap_or_default();
                if ui.color_edit_button_srgba(&mut color).changed() {
                    let event = ChangeGroupColor::new(index, color_to_hex(color));
                    event_queue.queue_event(Box::new(event));
                }
                ui.label(format!("{} ({})", grp.name, grp.sample_names.len()));
                if ui
                    .small_button("🗑")
                    .on_hover_text("Remove group")
                    .clicked()
                {
                    event_queue.queue_event(Box::new(RemoveGroup::new(index)));
                }
            });
        }
        ui.horizontal(|ui| {
            if ui.button("Add group").clicked() {
                event_queue.queue_event(Box::new(AddGroup::new()));
            }
            if ui.button("Reset").clicked() {
                self.reset_modal_open = true;
            }
        });
        ui.separator();

        ui.heading("Samples");
        if groups.samples().is_empty() {
            ui.weak("Show the PCA plot to color its samples.");
            return;
        }
        let choices = groups.choices();
        egui::ScrollArea::vertical()
            .id_salt("samples_scroll")
            .show(ui, |ui| {
                egui::Grid::new("samples_grid")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        for sample in groups.samples() {
                            ui.label(sample.name.as_str());
                            let selected = groups
                                .group_of(&sample.name)
                                .map(|grp| grp.name.as_str())
                                .unwrap_or("Select group");
                            egui::ComboBox::from_id_salt(("group_select", &sample.name))
                                .selected_text(selected)
                                .show_ui(ui, |ui| {
                                    for (choice, grp) in choices.iter().zip(groups.groups()) {
                                        let is_current =
                                            sample.group_id.as_ref() == Some(&choice.group_id);
                                        let color = parse_color(&choice.color_code)
                                            .unwrap_or(ui.visuals().text_color());
                                        let label = RichText::new(format!("⏺ {}", grp.name)).color(color);
                                        if ui.selectable_label(is_current, label).clicked() {
                                            let event =
                                                AssignSample::new(sample.name.clone(), choice.clone());
                                            event_queue.queue_event(Box::new(event));
                                        }
                                    }
                                });
                            ui.end_row();
                        }
                    });
            });
    }

    fn render_reset_modal(&mut self, event_queue: &mut EventQueue<EguiApp>, ctx: &egui::Context) {
        if !self.reset_modal_open {
            return;
        }
        let modal = egui::Modal::new("reset_groups_modal".into()).show(ctx, |ui| {
            ui.heading("Reset groups?");
            ui.label("All samples get the default color and only the two default groups remain.");
            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Reset").clicked() {
                    event_queue.queue_event(Box::new(ResetGroups::new()));
                    self.reset_modal_open = false;
                }
                if ui.button("Cancel").clicked() {
                    self.reset_modal_open = false;
                }
            });
        });
        if modal.should_close() {
            self.reset_modal_open = false;
        }
    }
}
