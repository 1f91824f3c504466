pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{FileDisplay, MapClient};
pub use app::pipelines::map_pipeline::MapPipeline;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{engine::PrintEngine, watch::WatchLoop};
pub use domain::model::PrintOutcome;
pub use utils::error::{IssError, Result};
