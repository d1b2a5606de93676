pub mod domain;
pub mod editing;
pub mod infrastructure;
pub mod media_codec;
