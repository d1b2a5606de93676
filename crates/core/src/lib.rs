pub mod inpainting;
pub mod masking;
pub mod pipeline;
pub mod selection;
pub mod shared;
pub mod stages;
pub mod video;
