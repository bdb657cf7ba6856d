use std::path::PathBuf;

use eframe::egui;

mod annotation;
mod app;
mod canvas;
mod export;
mod geometry;
mod presentation;
mod storage;

use app::PinmarkApp;

fn main() {
    // Optional: open an image straight away instead of going through the
    // upload dialog.
    let image_path = std::env::args().nth(1).map(PathBuf::from);
    if let Some(ref path) = image_path {
        if !path.exists() {
            eprintln!("File not found: {}", path.display());
            std::process::exit(1);
        }
    }

    let title = "Pinmark — Image Annotation Tool";
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(title),
        ..Default::default()
    };

    eframe::run_native(
        title,
        options,
        Box::new(move |cc| Ok(Box::new(PinmarkApp::new(cc, image_path)))),
    )
    .expect("Failed to run eframe");
}
