//! Resource streaming
//!
//! Assets are read and deserialized on a streamer thread; resource managers
//! observe completion either without blocking (`dispatch`, once per frame) or
//! by joining a pending load (`enforce_fully_loaded`).

mod asset;
mod memory_file;
mod resource_streamer;
mod resource_manager_template;

pub use asset::{AssetId, INVALID_ASSET_ID, AssetSource, MemoryAssetSource};
pub use memory_file::MemoryFile;
pub use resource_streamer::{ResourceStreamer, PendingLoad};
pub use resource_manager_template::{ResourceManagerTemplate, LoadingState};
