use eframe::egui;
use song_search::app::SongSearchApp;
use song_search::config::AppConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::default();
    let title = config.window_title.clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(&title)
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([700.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(SongSearchApp::new(config)))),
    )
}
