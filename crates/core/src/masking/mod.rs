pub mod frame_sampler;
pub mod mask_synthesizer;
pub mod morphology;
pub mod otsu;
