pub mod app;
pub mod client;
pub mod config;
pub mod correlation;
pub mod dashboard;
pub mod errors;
pub mod fetch;
pub mod handlers;
pub mod models;
pub mod regions;
pub mod state;
pub mod stats;
pub mod trends;
pub mod ui;

pub use app::router;
pub use client::{ApiClient, Session};
pub use config::{PortalConfig, resolve_config};
pub use state::AppState;
