pub mod cpu_inpainter;
