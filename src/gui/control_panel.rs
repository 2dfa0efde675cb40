//! Control Panel Widget
//! Left side panel: data source, column selection, chart type and style.

use crate::charts::{ChartError, ChartFamily, ChartKind, ChartRequest, LineStyle, StyleConfig};
use crate::config::AppConfig;
use crate::data::{FileFormat, GeneratorSpec, TextEncoding, MAX_SAMPLES, MIN_SAMPLES};
use egui::{Color32, ComboBox, RichText, ScrollArea};
use std::path::PathBuf;

/// Where the next load reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Upload,
    Generate,
}

/// Status line severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Explicit widget state. Requests are built from a snapshot of this.
#[derive(Clone)]
pub struct UserSettings {
    pub source_mode: SourceMode,
    pub file_path: Option<PathBuf>,
    pub file_format: FileFormat,
    pub encoding: TextEncoding,
    pub delimiter: String,
    pub sample_count: usize,
    pub family: ChartFamily,
    pub kind: ChartKind,
    pub axes: [String; 3],
    pub color: [u8; 3],
    pub marker_size: u32,
    pub line_style: LineStyle,
    pub bin_count: u32,
    pub open_after_export: bool,
}

impl UserSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let style = config.default_style();
        let (r, g, b) = style.rgb_tuple();
        Self {
            source_mode: SourceMode::Generate,
            file_path: None,
            file_format: FileFormat::Csv,
            encoding: config.csv_encoding,
            delimiter: ",".to_string(),
            sample_count: config.sample_count.clamp(MIN_SAMPLES, MAX_SAMPLES),
            family: ChartFamily::OneD,
            kind: ChartKind::Histogram,
            axes: Default::default(),
            color: [r, g, b],
            marker_size: style.marker_size(),
            line_style: style.line_style(),
            bin_count: style.bin_count(),
            open_after_export: false,
        }
    }

    pub fn generator_spec(&self) -> GeneratorSpec {
        GeneratorSpec::new(self.sample_count)
    }

    /// CSV delimiter from the text box; the first byte wins, `\t` means tab.
    pub fn delimiter_byte(&self) -> Option<u8> {
        match self.delimiter.as_str() {
            "" => None,
            "\\t" => Some(b'\t'),
            s => s.bytes().next(),
        }
    }

    pub fn color_hex(&self) -> String {
        format!(
            "#{:02X}{:02X}{:02X}",
            self.color[0], self.color[1], self.color[2]
        )
    }

    pub fn style(&self) -> Result<StyleConfig, ChartError> {
        StyleConfig::new(
            &self.color_hex(),
            self.marker_size,
            self.line_style,
            self.bin_count,
        )
    }

    /// Build the request for the current chart settings.
    pub fn chart_request(&self) -> Result<ChartRequest, ChartError> {
        let axis_count = self.family.axis_count();
        let axes: Vec<String> = self.axes[..axis_count]
            .iter()
            .filter(|name| !name.is_empty())
            .cloned()
            .collect();
        Ok(ChartRequest::new(self.family, self.kind, axes, self.style()?))
    }
}

/// Left side control panel.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub columns: Vec<String>,
    pub selected_cols: Vec<bool>,
    pub numeric_columns: Vec<String>,
    pub status: String,
    pub status_kind: StatusKind,
    pub export_enabled: bool,
}

impl ControlPanel {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            settings: UserSettings::from_config(config),
            columns: Vec::new(),
            selected_cols: Vec::new(),
            numeric_columns: Vec::new(),
            status: "Ready".to_string(),
            status_kind: StatusKind::Info,
            export_enabled: false,
        }
    }

    /// Update available columns after a load. Every column starts selected.
    pub fn update_columns(&mut self, columns: Vec<String>) {
        self.selected_cols = vec![true; columns.len()];
        self.columns = columns;
    }

    /// Update the numeric subset and keep axis choices valid and distinct.
    pub fn update_numeric(&mut self, numeric: Vec<String>) {
        let mut used: Vec<String> = Vec::new();
        for axis in self.settings.axes.iter_mut() {
            if !numeric.contains(axis) || used.contains(axis) {
                *axis = numeric
                    .iter()
                    .find(|name| !used.contains(name))
                    .or_else(|| numeric.first())
                    .cloned()
                    .unwrap_or_default();
            }
            used.push(axis.clone());
        }
        self.numeric_columns = numeric;
    }

    /// Get the columns currently ticked.
    pub fn get_selected_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(self.selected_cols.iter())
            .filter(|(_, &selected)| selected)
            .map(|(col, _)| col.clone())
            .collect()
    }

    pub fn set_status(&mut self, kind: StatusKind, status: &str) {
        self.status_kind = kind;
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Vizboard")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();

        self.show_source_section(ui, &mut action);
        ui.separator();
        self.show_column_section(ui, &mut action);
        ui.separator();
        self.show_chart_section(ui, &mut action);
        ui.separator();
        self.show_style_section(ui, &mut action);
        ui.separator();

        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("💾 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
            ui.checkbox(&mut self.settings.open_after_export, "Open after export");
        });

        ui.add_space(10.0);
        let status_color = match self.status_kind {
            StatusKind::Error => Color32::from_rgb(220, 53, 69),
            StatusKind::Success => Color32::from_rgb(40, 167, 69),
            StatusKind::Info => Color32::GRAY,
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    fn show_source_section(&mut self, ui: &mut egui::Ui, action: &mut ControlPanelAction) {
        ui.label(RichText::new("1️⃣ Provide Your Data").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.radio_value(&mut self.settings.source_mode, SourceMode::Upload, "Upload File");
            ui.radio_value(
                &mut self.settings.source_mode,
                SourceMode::Generate,
                "Generate Random Data",
            );
        });

        match self.settings.source_mode {
            SourceMode::Upload => {
                ui.horizontal(|ui| {
                    ui.label("File Type:");
                    ComboBox::from_id_salt("file_format")
                        .selected_text(self.settings.file_format.label())
                        .show_ui(ui, |ui| {
                            for format in FileFormat::ALL {
                                ui.selectable_value(
                                    &mut self.settings.file_format,
                                    format,
                                    format.label(),
                                );
                            }
                        });
                });

                if self.settings.file_format != FileFormat::Excel {
                    ui.horizontal(|ui| {
                        ui.label("Encoding:");
                        ComboBox::from_id_salt("encoding")
                            .selected_text(self.settings.encoding.label())
                            .show_ui(ui, |ui| {
                                for encoding in TextEncoding::ALL {
                                    ui.selectable_value(
                                        &mut self.settings.encoding,
                                        encoding,
                                        encoding.label(),
                                    );
                                }
                            });
                    });
                }

                if self.settings.file_format == FileFormat::Csv {
                    ui.horizontal(|ui| {
                        ui.label("Delimiter:");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.settings.delimiter)
                                .desired_width(40.0),
                        );
                    });
                }

                ui.horizontal(|ui| {
                    let path_text = self
                        .settings
                        .file_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());
                    ui.label(RichText::new(path_text).size(12.0));

                    if ui.button("📂 Browse").clicked() {
                        *action = ControlPanelAction::BrowseFile;
                    }
                });
            }
            SourceMode::Generate => {
                ui.add(
                    egui::Slider::new(&mut self.settings.sample_count, MIN_SAMPLES..=MAX_SAMPLES)
                        .text("Number of samples"),
                );
            }
        }

        ui.add_space(5.0);
        if ui.button("▶ Load Data").clicked() {
            *action = ControlPanelAction::LoadData;
        }
    }

    fn show_column_section(&mut self, ui: &mut egui::Ui, action: &mut ControlPanelAction) {
        ui.label(RichText::new("2️⃣ Select Columns").size(14.0).strong());

        if self.columns.is_empty() {
            ui.label(RichText::new("No data loaded").color(Color32::GRAY));
            return;
        }

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical().max_height(120.0).show(ui, |ui| {
                    for (i, col) in self.columns.iter().enumerate() {
                        if i < self.selected_cols.len()
                            && ui.checkbox(&mut self.selected_cols[i], col).changed()
                        {
                            *action = ControlPanelAction::Refresh;
                        }
                    }
                });
            });

        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                self.selected_cols.iter_mut().for_each(|v| *v = true);
                *action = ControlPanelAction::Refresh;
            }
            if ui.small_button("Clear All").clicked() {
                self.selected_cols.iter_mut().for_each(|v| *v = false);
                *action = ControlPanelAction::Refresh;
            }
        });
    }

    fn show_chart_section(&mut self, ui: &mut egui::Ui, action: &mut ControlPanelAction) {
        ui.label(RichText::new("3️⃣ Visualization Settings").size(14.0).strong());

        let label_width = 90.0;
        let combo_width = 150.0;
        let mut changed = false;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Type:"));
            ComboBox::from_id_salt("family")
                .width(combo_width)
                .selected_text(self.settings.family.label())
                .show_ui(ui, |ui| {
                    for family in ChartFamily::ALL {
                        changed |= ui
                            .selectable_value(&mut self.settings.family, family, family.label())
                            .changed();
                    }
                });
        });

        if !self.settings.family.supports(self.settings.kind) {
            self.settings.kind = self.settings.family.kinds()[0];
        }

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Plot:"));
            ComboBox::from_id_salt("kind")
                .width(combo_width)
                .selected_text(self.settings.kind.label())
                .show_ui(ui, |ui| {
                    for &kind in self.settings.family.kinds() {
                        changed |= ui
                            .selectable_value(&mut self.settings.kind, kind, kind.label())
                            .changed();
                    }
                });
        });

        let axis_labels = ["X-axis:", "Y-axis:", "Z-axis:"];
        let single_label = ["Column:"];
        let labels: &[&str] = if self.settings.family == ChartFamily::OneD {
            &single_label
        } else {
            &axis_labels[..self.settings.family.axis_count()]
        };

        for (i, label) in labels.iter().enumerate() {
            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new(*label));
                ComboBox::from_id_salt(("axis", i))
                    .width(combo_width)
                    .selected_text(&self.settings.axes[i])
                    .show_ui(ui, |ui| {
                        for col in &self.numeric_columns {
                            if ui
                                .selectable_label(self.settings.axes[i] == *col, col)
                                .clicked()
                            {
                                self.settings.axes[i] = col.clone();
                                changed = true;
                            }
                        }
                    });
            });
        }

        if changed {
            *action = ControlPanelAction::Refresh;
        }
    }

    fn show_style_section(&mut self, ui: &mut egui::Ui, action: &mut ControlPanelAction) {
        ui.label(RichText::new("4️⃣ Aesthetics Settings").size(14.0).strong());

        let mut changed = false;

        ui.horizontal(|ui| {
            ui.label("Color:");
            changed |= ui.color_edit_button_srgb(&mut self.settings.color).changed();
        });

        changed |= ui
            .add(
                egui::Slider::new(
                    &mut self.settings.marker_size,
                    StyleConfig::MARKER_SIZE_RANGE,
                )
                .text("Marker Size"),
            )
            .changed();

        ui.horizontal(|ui| {
            ui.label("Line Style:");
            ComboBox::from_id_salt("line_style")
                .selected_text(self.settings.line_style.symbol())
                .show_ui(ui, |ui| {
                    for style in LineStyle::ALL {
                        changed |= ui
                            .selectable_value(&mut self.settings.line_style, style, style.symbol())
                            .changed();
                    }
                });
        });

        changed |= ui
            .add(
                egui::Slider::new(&mut self.settings.bin_count, StyleConfig::BIN_COUNT_RANGE)
                    .text("Number of bins"),
            )
            .changed();

        if changed {
            *action = ControlPanelAction::Refresh;
        }
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseFile,
    LoadData,
    /// Selection, chart or style changed: run a new pass.
    Refresh,
    ExportPng,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> ControlPanel {
        ControlPanel::new(&AppConfig::default())
    }

    #[test]
    fn test_axes_follow_numeric_subset() {
        let mut panel = panel();
        panel.update_numeric(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(panel.settings.axes, ["a".to_string(), "b".into(), "c".into()]);

        panel.settings.axes[0] = "c".into();
        panel.update_numeric(vec!["b".into(), "c".into()]);
        assert_eq!(panel.settings.axes[0], "c");
        assert_eq!(panel.settings.axes[1], "b");
    }

    #[test]
    fn test_request_uses_family_axis_count() {
        let mut panel = panel();
        panel.update_numeric(vec!["x".into(), "y".into(), "z".into()]);
        panel.settings.family = ChartFamily::TwoD;
        panel.settings.kind = ChartKind::Box;
        let request = panel.settings.chart_request().unwrap();
        assert_eq!(request.axis_columns, vec!["x", "y"]);
        assert_eq!(request.style.color(), "#FF6347");
    }

    #[test]
    fn test_selected_columns() {
        let mut panel = panel();
        panel.update_columns(vec!["a".into(), "b".into()]);
        assert_eq!(panel.get_selected_columns(), vec!["a", "b"]);
        panel.selected_cols[0] = false;
        assert_eq!(panel.get_selected_columns(), vec!["b"]);
    }

    #[test]
    fn test_delimiter_byte() {
        let mut settings = UserSettings::from_config(&AppConfig::default());
        assert_eq!(settings.delimiter_byte(), Some(b','));
        settings.delimiter = "\\t".into();
        assert_eq!(settings.delimiter_byte(), Some(b'\t'));
        settings.delimiter.clear();
        assert_eq!(settings.delimiter_byte(), None);
    }
}
