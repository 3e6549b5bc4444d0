mod app;
mod upload;
mod utils;

use app::TinyDrop;
use eframe::CreationContext;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([480.0, 640.0])
            .with_min_inner_size([400.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "TinyDrop",
        options,
        Box::new(|cc: &CreationContext| Box::new(TinyDrop::new(cc))),
    )
}
