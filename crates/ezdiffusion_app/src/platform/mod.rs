mod app;
mod config;
mod console;
mod effects;
mod logging;
mod persistence;

pub use app::run_app;
