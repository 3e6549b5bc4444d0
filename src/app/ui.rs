use super::state::{IncomingFile, UploadRecord};
use super::{TinyDrop, View};
use crate::utils::file_size::format_size;
use eframe::egui::{self, Align, Color32, RichText};
use rfd::FileDialog;

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);
const SUCCESS_GREEN: Color32 = Color32::from_rgb(0, 180, 0);
const ERROR_RED: Color32 = Color32::from_rgb(220, 50, 50);

impl TinyDrop {
    pub fn render(&mut self, ctx: &egui::Context) {
        self.collect_dropped_files(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(20.0);
            ui.vertical_centered(|ui| {
                ui.heading("TinyDrop");
                ui.add_space(5.0);
                ui.label(
                    RichText::new("Drop files, get short links")
                        .color(ui.visuals().text_color().gamma_multiply(0.7)),
                );
            });

            ui.add_space(15.0);
            self.render_tabs(ui);
            ui.add_space(10.0);

            egui::ScrollArea::vertical().show(ui, |ui| match self.view {
                View::Upload => self.render_upload_view(ui),
                View::Queue => self.render_queue_view(ui),
            });
        });
    }

    /// Dropped files land in the staging buffer from the Upload view, or
    /// merge straight into the live queue from the Queue view.
    fn collect_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }

        let files: Vec<IncomingFile> =
            dropped.iter().filter_map(IncomingFile::from_dropped).collect();
        log::info!("received {} dropped files", files.len());

        match self.view {
            View::Upload => self.stage_files(files),
            View::Queue => self.enqueue_files(files),
        }
    }

    fn render_tabs(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let upload = RichText::new("Upload");
            let upload = if self.view == View::Upload {
                upload.strong()
            } else {
                upload
            };
            if ui.button(upload).clicked() {
                self.view = View::Upload;
            }

            ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                let queue = RichText::new(format!("Queue({})", self.pending_uploads));
                let queue = if self.view == View::Queue {
                    queue.strong()
                } else {
                    queue
                };
                if ui.button(queue).clicked() {
                    self.view = View::Queue;
                }
            });
        });
    }

    fn render_upload_view(&mut self, ui: &mut egui::Ui) {
        let hovering = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
        let stroke = if hovering {
            egui::Stroke::new(2.0, ACCENT)
        } else {
            egui::Stroke::new(1.0, ui.visuals().weak_text_color())
        };

        egui::Frame::none()
            .stroke(stroke)
            .rounding(egui::Rounding::same(16.0))
            .inner_margin(20.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("📤").size(40.0).color(ACCENT));
                    ui.label("Drag & Drop Files Here");
                    ui.label(RichText::new("or").weak());
                    if ui.button("Browse Files").clicked() {
                        if let Some(paths) = FileDialog::new().pick_files() {
                            let files =
                                paths.into_iter().filter_map(IncomingFile::from_path).collect();
                            self.stage_files(files);
                        }
                    }
                });
            });

        ui.add_space(10.0);

        if !self.staged.is_empty() {
            ui.group(|ui| {
                ui.set_width(ui.available_width());
                for group in &self.staged.groups {
                    ui.label(RichText::new(&group.extension).strong());
                    for record in &group.records {
                        ui.horizontal(|ui| {
                            ui.label(&record.name);
                            ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                                ui.label(RichText::new(format_size(record.size_bytes)).weak());
                            });
                        });
                    }
                    ui.add_space(4.0);
                }
            });
            ui.add_space(10.0);
        }

        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!self.staged.is_empty(), |ui| {
                let button = egui::Button::new("Upload")
                    .min_size(egui::vec2(200.0, 36.0))
                    .fill(ACCENT);
                if ui.add(button).clicked() {
                    self.commit_staged();
                }
            });
        });
    }

    fn render_queue_view(&mut self, ui: &mut egui::Ui) {
        if self.queue.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(30.0);
                ui.label(RichText::new("Nothing queued yet").weak());
            });
            return;
        }

        for group in &self.queue.groups {
            ui.group(|ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(&group.extension).strong());
                ui.add_space(4.0);
                for record in &group.records {
                    Self::render_record(ui, record);
                    ui.add_space(6.0);
                }
            });
            ui.add_space(10.0);
        }
    }

    fn render_record(ui: &mut egui::Ui, record: &UploadRecord) {
        let fill = if record.failed { ERROR_RED } else { ACCENT };
        let label = format!("{}  {}%", record.name, record.progress.round() as u32);
        ui.add(
            egui::ProgressBar::new(record.progress / 100.0)
                .text(label)
                .fill(fill),
        );

        if record.failed {
            ui.colored_label(ERROR_RED, "❌ Upload failed");
        } else if !record.download_link.is_empty() {
            ui.horizontal(|ui| {
                ui.colored_label(SUCCESS_GREEN, "✅");
                ui.label(&record.download_link);
                if ui.button("📋 Copy").clicked() {
                    ui.output_mut(|o| o.copied_text = record.download_link.clone());
                }
                if ui.button("🌐 Open").clicked() {
                    if let Err(e) = open::that(&record.download_link) {
                        log::warn!("failed to open {}: {}", record.download_link, e);
                    }
                }
            });
        }
    }
}
