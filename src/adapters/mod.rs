// Adapters layer: concrete implementations for external systems (http, display).
// Local storage lives with the CLI config in src/config/cli.rs.

pub mod display;
pub mod http;

pub use display::FileDisplay;
pub use http::MapClient;
