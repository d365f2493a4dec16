#![warn(clippy::all, rust_2018_idioms)]

mod app;
mod backend_state;
pub mod state;

pub use app::config::{Args, Config};
pub use app::EguiApp;
pub use backend_state::{BackendAppState, Gateway};
