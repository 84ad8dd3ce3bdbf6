pub mod app;
pub mod config;
pub mod document;
pub mod editor;
pub mod errors;
pub mod google;
pub mod handlers;
pub mod models;
pub mod recency;
pub mod sheet;
pub mod state;
pub mod storage;
pub mod ui;
pub mod workflow;

pub use app::router;
pub use config::{load_registry, Settings};
pub use state::AppState;
