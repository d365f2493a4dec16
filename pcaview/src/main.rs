#![warn(clippy::all, rust_2018_idioms)]

use app_core::backend::BackendEventLoop;
use clap::Parser;
use pcaview::{Args, BackendAppState, Config, EguiApp, Gateway};

const WINDOW_NAME: &str = "PCA Viewer";
const WINDOW_WIDTH: f32 = 1200.0;
const WINDOW_HEIGHT: f32 = 800.0;

fn main() -> eframe::Result {
    let args = Args::parse();
    env_logger::init();

    let mut config = match Config::from_config_file() {
        Ok(config) => config,
        Err(err) => {
            log::warn!("unable to load config file \".pcaview\" from home directory: {err}");
            Config::default()
        }
    };
    config.apply_args(args);

    // start backend loop
    let (command_tx, command_rx) = std::sync::mpsc::channel();
    let gateway = Gateway::new(&config.backend_url, config.timeout());
    let backend_state = BackendAppState::new(gateway);
    let eventloop_handle = BackendEventLoop::new(command_rx, backend_state).run();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT])
            .with_min_inner_size([WINDOW_WIDTH / 2.0, WINDOW_HEIGHT / 2.0]),
        ..Default::default()
    };
    eframe::run_native(
        WINDOW_NAME,
        native_options,
        Box::new(|cc| {
            Ok(Box::new(EguiApp::new(
                cc,
                config,
                command_tx,
                eventloop_handle,
            )))
        }),
    )
}
