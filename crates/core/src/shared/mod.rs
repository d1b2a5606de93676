pub mod constants;
pub mod error;
pub mod frame;
pub mod frame_window;
pub mod mask;
pub mod region;
pub mod video_asset;
pub mod video_metadata;
