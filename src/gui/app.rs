//! Vizboard Main Application
//! Main window with control panel and chart viewer. Every interaction runs
//! one synchronous pass: intake -> select -> numeric filter -> render.

use crate::charts::ChartDispatcher;
use crate::config::AppConfig;
use crate::data::{delimiter_name, DataLoader, DataProcessor, DataSource, FileFormat};
use crate::gui::control_panel::{SourceMode, StatusKind};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use anyhow::{Context, Result};
use egui::SidePanel;
use std::path::Path;

/// Main application window.
pub struct DashboardApp {
    config: AppConfig,
    loader: DataLoader,
    dispatcher: ChartDispatcher,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        Self {
            dispatcher: ChartDispatcher::from_config(&config),
            control_panel: ControlPanel::new(&config),
            loader: DataLoader::new(),
            chart_viewer: ChartViewer::new(),
            config,
        }
    }

    /// Handle file selection
    fn handle_browse_file(&mut self) {
        let format = self.control_panel.settings.file_format;
        let Some(path) = rfd::FileDialog::new()
            .add_filter(format.label(), &[format.label()])
            .pick_file()
        else {
            return;
        };

        if let Some(detected) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(FileFormat::from_extension)
        {
            self.control_panel.settings.file_format = detected;
        }
        self.control_panel.settings.file_path = Some(path);
        self.handle_load();
    }

    fn read_upload(&self, path: &Path) -> Result<DataSource> {
        let settings = &self.control_panel.settings;
        let bytes =
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(DataSource::Upload {
            name,
            bytes,
            format: settings.file_format,
            encoding: settings.encoding,
            delimiter: settings.delimiter_byte(),
        })
    }

    fn current_source(&self) -> Result<Option<DataSource>> {
        let settings = &self.control_panel.settings;
        match settings.source_mode {
            SourceMode::Generate => Ok(Some(DataSource::Generate(settings.generator_spec()))),
            SourceMode::Upload => match &settings.file_path {
                Some(path) => self.read_upload(path).map(Some),
                None => Ok(None),
            },
        }
    }

    /// Load from the current source, then run a full pass.
    fn handle_load(&mut self) {
        self.chart_viewer.clear();
        self.control_panel.update_columns(Vec::new());
        self.control_panel.export_enabled = false;

        let source = match self.current_source() {
            Ok(source) => source,
            Err(e) => {
                self.report_error(&format!("{:#}", e));
                return;
            }
        };

        match self.loader.load(source) {
            Ok(df) => {
                let cols = df.width();
                let mut message = format!(
                    "Loaded {}: {} rows, {} columns",
                    self.loader.get_source_name().unwrap_or("data"),
                    self.loader.get_row_count(),
                    cols
                );
                if let Some(separator) = self.loader.get_delimiter() {
                    message.push_str(&format!(" ({}-separated)", delimiter_name(separator)));
                }
                self.control_panel.update_columns(self.loader.get_columns());
                self.control_panel.set_status(StatusKind::Success, &message);
                self.run_pass(false);
            }
            Err(e) => self.report_error(&e.to_string()),
        }
    }

    /// Selection -> numeric filter -> render against the loaded frame.
    fn run_pass(&mut self, report_success: bool) {
        self.chart_viewer.clear_chart();
        self.control_panel.export_enabled = false;

        let Some(df) = self.loader.get_dataframe() else {
            self.report_error("No data loaded");
            return;
        };

        self.chart_viewer.set_preview(
            self.loader.get_columns(),
            DataProcessor::preview_rows(df, self.config.preview_rows),
            df.height(),
        );

        let selected_names = self.control_panel.get_selected_columns();
        let selected = match DataProcessor::select(df, &selected_names) {
            Ok(selected) => selected,
            Err(e) => {
                self.report_error(&e.to_string());
                return;
            }
        };

        match DataProcessor::require_numeric(&selected) {
            Ok(numeric) => self.control_panel.update_numeric(numeric),
            Err(e) => {
                self.control_panel.update_numeric(Vec::new());
                self.report_error(&e.to_string());
                return;
            }
        }

        let rendered = self
            .control_panel
            .settings
            .chart_request()
            .and_then(|request| self.dispatcher.render(&selected, &request));

        match rendered {
            Ok(chart) => {
                log::debug!("Rendered {} ({} marks)", chart.title, chart.geometry.mark_count());
                if report_success {
                    let status = format!("Rendered {}", chart.title);
                    self.control_panel.set_status(StatusKind::Success, &status);
                }
                self.chart_viewer.set_chart(chart);
                self.control_panel.export_enabled = true;
            }
            Err(e) => self.report_error(&e.to_string()),
        }
    }

    /// Save the current chart as PNG
    fn handle_export_png(&mut self) {
        let Some(chart) = self.chart_viewer.chart() else {
            self.report_error("No chart to export");
            return;
        };

        let file_name = format!("{}.png", chart.title.replace([' ', ':', '&'], "_"));
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(file_name)
            .save_file()
        else {
            return;
        };

        match self.write_png(&path) {
            Ok(()) => {
                log::info!("Exported chart to {}", path.display());
                self.control_panel
                    .set_status(StatusKind::Success, &format!("Exported {}", path.display()));
                if self.control_panel.settings.open_after_export {
                    if let Err(e) = open::that(&path) {
                        log::warn!("Could not open {}: {}", path.display(), e);
                    }
                }
            }
            Err(e) => self.report_error(&format!("{:#}", e)),
        }
    }

    fn write_png(&self, path: &Path) -> Result<()> {
        let chart = self
            .chart_viewer
            .chart()
            .context("no chart to export")?;
        let bytes = chart.to_png().context("encoding PNG")?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    fn report_error(&mut self, message: &str) {
        log::warn!("{}", message);
        self.control_panel
            .set_status(StatusKind::Error, &format!("Error: {}", message));
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseFile => self.handle_browse_file(),
                        ControlPanelAction::LoadData => self.handle_load(),
                        ControlPanelAction::Refresh => self.run_pass(true),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ctx, ui);
        });
    }
}
