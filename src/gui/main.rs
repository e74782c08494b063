// GUI entry point for image-compressor
// This binary provides a graphical interface for the batch converter

use eframe::egui;

mod app;
use app::ImageCompressorApp;

fn main() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([560.0, 660.0])
            .with_min_inner_size([480.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Image Compressor",
        options,
        Box::new(|cc| Ok(Box::new(ImageCompressorApp::new(cc)))),
    )
}
