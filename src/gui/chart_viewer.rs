//! Chart Viewer Widget
//! Central panel: dataset preview grid above the rendered chart.

use crate::charts::RenderedChart;
use egui::{Color32, RichText, ScrollArea};

/// Preview and chart display area.
#[derive(Default)]
pub struct ChartViewer {
    preview_header: Vec<String>,
    preview_rows: Vec<Vec<String>>,
    total_rows: usize,
    chart: Option<RenderedChart>,
    texture: Option<egui::TextureHandle>,
    texture_dirty: bool,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear preview and chart
    pub fn clear(&mut self) {
        self.preview_header.clear();
        self.preview_rows.clear();
        self.total_rows = 0;
        self.clear_chart();
    }

    pub fn clear_chart(&mut self) {
        self.chart = None;
        self.texture = None;
        self.texture_dirty = false;
    }

    pub fn set_preview(&mut self, header: Vec<String>, rows: Vec<Vec<String>>, total_rows: usize) {
        self.preview_header = header;
        self.preview_rows = rows;
        self.total_rows = total_rows;
    }

    /// Replace the displayed chart. The texture is uploaded on the next frame.
    pub fn set_chart(&mut self, chart: RenderedChart) {
        self.chart = Some(chart);
        self.texture_dirty = true;
    }

    pub fn chart(&self) -> Option<&RenderedChart> {
        self.chart.as_ref()
    }

    /// Draw the viewer
    pub fn show(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        if self.preview_header.is_empty() && self.chart.is_none() {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new("Upload a file or generate random data to begin")
                        .size(18.0)
                        .color(Color32::GRAY),
                );
            });
            return;
        }

        ScrollArea::vertical().show(ui, |ui| {
            self.show_preview(ui);
            ui.add_space(15.0);
            self.show_chart(ctx, ui);
        });
    }

    fn show_preview(&self, ui: &mut egui::Ui) {
        if self.preview_header.is_empty() {
            return;
        }

        ui.label(RichText::new("Data Preview").size(16.0).strong());
        ui.label(
            RichText::new(format!(
                "{} rows × {} columns",
                self.total_rows,
                self.preview_header.len()
            ))
            .size(11.0)
            .color(Color32::GRAY),
        );

        ScrollArea::horizontal()
            .id_salt("preview_scroll")
            .show(ui, |ui| {
                egui::Grid::new("preview_grid")
                    .striped(true)
                    .min_col_width(60.0)
                    .show(ui, |ui| {
                        for name in &self.preview_header {
                            ui.label(RichText::new(name).strong());
                        }
                        ui.end_row();

                        for row in &self.preview_rows {
                            for cell in row {
                                ui.label(cell);
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    fn show_chart(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let Some(chart) = &self.chart else {
            return;
        };

        if self.texture_dirty || self.texture.is_none() {
            let image = egui::ColorImage::from_rgb(
                [chart.width as usize, chart.height as usize],
                &chart.pixels,
            );
            self.texture = Some(ctx.load_texture("chart", image, egui::TextureOptions::LINEAR));
            self.texture_dirty = false;
        }

        ui.label(RichText::new(&chart.title).size(16.0).strong());
        if let Some(texture) = &self.texture {
            ui.add(
                egui::Image::new(egui::load::SizedTexture::from_handle(texture)).shrink_to_fit(),
            );
        }
    }
}
