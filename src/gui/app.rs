use eframe::egui;
use image_compressor::cli::{DEFAULT_EXTENSIONS, OutputFormat};
use image_compressor::selection::Selection;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use strum::IntoEnumIterator;

#[path = "app_processing.rs"]
mod app_processing;

/// How the user last picked inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectionMode {
    Files,
    Folder,
}

pub struct ImageCompressorApp {
    // Input selection
    selection_mode: SelectionMode,
    selection: Selection,

    // Output
    output_dir: String,

    // Conversion settings
    format: OutputFormat,
    quality: u8,
    compress: bool,
    auto_orient: bool,

    // Processing state
    is_processing: bool,
    progress: f32,
    current_file: String,
    processed_count: usize,
    total_count: usize,

    // Results
    results_message: String,
    error_message: String,
    file_errors: Vec<String>,

    // Communication channel for background processing
    progress_receiver: Option<Receiver<ProgressMessage>>,
}

#[derive(Debug)]
pub(crate) enum ProgressMessage {
    Progress {
        current: usize,
        total: usize,
        file: String,
    },
    FileError(String),
    Complete {
        converted: usize,
        skipped: usize,
        failed: usize,
        run_dir: PathBuf,
    },
    Error(String),
}

/// Extensions offered by the file picker and used for folder scans
pub(crate) fn scan_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.split(',').map(String::from).collect()
}

impl ImageCompressorApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            // Default values
            selection_mode: SelectionMode::Files,
            selection: Selection::default(),
            output_dir: String::new(),
            format: OutputFormat::Jpeg,
            quality: 60,
            compress: true,
            auto_orient: false,
            is_processing: false,
            progress: 0.0,
            current_file: String::new(),
            processed_count: 0,
            total_count: 0,
            results_message: String::new(),
            error_message: String::new(),
            file_errors: Vec::new(),
            progress_receiver: None,
        }
    }

    fn render_input_selection(&mut self, ui: &mut egui::Ui) {
        ui.heading("Input Selection");
        ui.separator();

        ui.horizontal(|ui| {
            ui.radio_value(
                &mut self.selection_mode,
                SelectionMode::Files,
                "Individual files",
            );
            ui.radio_value(&mut self.selection_mode, SelectionMode::Folder, "Folder");
        });

        ui.horizontal(|ui| {
            if ui.button("Browse...").clicked() {
                self.pick_inputs();
            }

            let label = match self.selection.len() {
                0 => "No images selected".to_string(),
                1 => "1 image selected".to_string(),
                n => format!("{} images selected", n),
            };
            ui.label(label);
        });

        ui.add_space(10.0);
    }

    /// Open the picker for the current mode. Each pick replaces the
    /// previous selection wholesale.
    fn pick_inputs(&mut self) {
        match self.selection_mode {
            SelectionMode::Files => {
                let extensions = scan_extensions();
                if let Some(paths) = rfd::FileDialog::new()
                    .add_filter("Images", &extensions)
                    .pick_files()
                {
                    self.selection = Selection::from_files(paths);
                }
            }
            SelectionMode::Folder => {
                if let Some(folder) = rfd::FileDialog::new().pick_folder() {
                    match Selection::scan_folder(&folder, &scan_extensions()) {
                        Ok(selection) => self.selection = selection,
                        Err(e) => {
                            self.error_message = format!("Failed to scan folder: {}", e);
                        }
                    }
                }
            }
        }
    }

    fn render_output_selection(&mut self, ui: &mut egui::Ui) {
        ui.heading("Output");
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Output folder:");
            ui.text_edit_singleline(&mut self.output_dir);
            if ui.button("Browse...").clicked() {
                if let Some(path) = rfd::FileDialog::new().pick_folder() {
                    self.output_dir = path.display().to_string();
                }
            }
        });
        ui.label("(Each run creates a fresh compressed_<timestamp> folder here)");

        ui.add_space(10.0);
    }

    fn render_conversion_settings(&mut self, ui: &mut egui::Ui) {
        ui.heading("Conversion Settings");
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Output format:");
            egui::ComboBox::from_id_salt("output_format")
                .selected_text(self.format.to_string())
                .show_ui(ui, |ui| {
                    for format in OutputFormat::iter() {
                        ui.selectable_value(&mut self.format, format, format.to_string());
                    }
                });
        });

        ui.checkbox(&mut self.compress, "Enable compression");

        ui.horizontal(|ui| {
            ui.label("Quality:");
            ui.add_enabled(
                self.compress,
                egui::Slider::new(&mut self.quality, 1..=100),
            );
        });
        if !self.compress {
            ui.label("(Compression disabled: images are re-encoded at maximum fidelity)");
        } else if self.format == OutputFormat::Png {
            ui.label("(PNG is lossless, the quality setting has no effect)");
        }

        ui.checkbox(&mut self.auto_orient, "Auto-orient images (EXIF)");

        ui.add_space(10.0);
    }

    fn render_process_button(&mut self, ui: &mut egui::Ui) {
        ui.separator();

        let button_text = if self.is_processing {
            "Processing..."
        } else {
            "Process Images"
        };

        let button = egui::Button::new(button_text).min_size(egui::vec2(200.0, 40.0));

        if ui.add_enabled(!self.is_processing, button).clicked() {
            self.start_processing();
        }

        ui.add_space(10.0);
    }

    fn render_progress(&mut self, ui: &mut egui::Ui) {
        if self.is_processing || !self.results_message.is_empty() {
            ui.heading("Progress");
            ui.separator();

            if self.is_processing {
                ui.label(format!(
                    "Processing: {}/{}",
                    self.processed_count, self.total_count
                ));
                ui.label(&self.current_file);

                let progress_bar = egui::ProgressBar::new(self.progress)
                    .show_percentage()
                    .animate(true);
                ui.add(progress_bar);
            }

            if !self.results_message.is_empty() {
                ui.label(&self.results_message);
            }
        }

        if !self.file_errors.is_empty() {
            ui.add_space(5.0);
            ui.label("Files with problems:");
            for line in &self.file_errors {
                ui.colored_label(egui::Color32::YELLOW, line);
            }
        }

        if !self.error_message.is_empty() {
            ui.colored_label(egui::Color32::RED, &self.error_message);
        }
    }
}

impl eframe::App for ImageCompressorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for progress updates from background thread
        self.check_progress();

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Image Compressor");
                ui.label("Batch convert images to JPEG, PNG or WebP");
                ui.add_space(20.0);

                self.render_input_selection(ui);
                self.render_output_selection(ui);
                self.render_conversion_settings(ui);
                self.render_process_button(ui);
                self.render_progress(ui);
            });
        });

        // Request repaint if processing
        if self.is_processing {
            ctx.request_repaint();
        }
    }
}
