pub mod cropper;
pub mod dewatermarker;
pub mod looper;
pub mod speed_changer;
pub mod trimmer;
