pub mod engine;
pub mod imaging;
pub mod quality;
pub mod tile;
pub mod watch;

pub use crate::domain::frame::FrameBuffer;
pub use crate::domain::model::{IssPosition, PrintOutcome, PrintReport, TileCoord};
pub use crate::domain::ports::{ConfigProvider, Display, Pipeline, Storage};
pub use crate::utils::error::Result;
