pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod routes;
pub mod sessions;
pub mod state;

pub use app::{build_registry, build_router, open_repository};
pub use config::{ConfigError, ServerConfig, WizardConfig, load_config};
pub use state::AppState;
