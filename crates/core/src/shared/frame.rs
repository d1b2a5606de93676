use ndarray::{s, ArrayView3};

use crate::shared::region::Region;

/// A single decoded video frame: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; stages treat the
/// pixel data as packed `height * width * channels` bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the same pixels under a new position in the stream.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Mean over every channel byte, used to reject black or fade-in frames.
    pub fn mean_intensity(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.data.iter().map(|&v| v as u64).sum();
        sum as f64 / self.data.len() as f64
    }

    /// Single-channel luma of the given rectangle (ITU-R BT.601 weights).
    ///
    /// The region must already lie inside the frame.
    pub fn luma_of(&self, region: &Region) -> Vec<u8> {
        let fw = self.width as usize;
        let channels = self.channels as usize;
        let (rx, ry) = (region.x as usize, region.y as usize);
        let (rw, rh) = (region.width as usize, region.height as usize);

        let mut gray = Vec::with_capacity(rw * rh);
        for row in ry..ry + rh {
            for col in rx..rx + rw {
                let offset = (row * fw + col) * channels;
                let value = if channels >= 3 {
                    let r = self.data[offset] as f32;
                    let g = self.data[offset + 1] as f32;
                    let b = self.data[offset + 2] as f32;
                    (0.299 * r + 0.587 * g + 0.114 * b).round()
                } else {
                    self.data[offset] as f32
                };
                gray.push(value.clamp(0.0, 255.0) as u8);
            }
        }
        gray
    }

    /// Copies out the given rectangle as a new frame with the same index.
    ///
    /// The region must already lie inside the frame.
    pub fn crop(&self, region: &Region) -> Frame {
        let (rx, ry) = (region.x as usize, region.y as usize);
        let (rw, rh) = (region.width as usize, region.height as usize);

        let data: Vec<u8> = self
            .as_ndarray()
            .slice(s![ry..ry + rh, rx..rx + rw, ..])
            .iter()
            .copied()
            .collect();
        Frame::new(data, rw as u32, rh as u32, self.channels, self.index)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(width: u32, height: u32) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = (y * width + x) as u8;
                data.extend_from_slice(&[v, v, v]);
            }
        }
        Frame::new(data, width, height, 3, 0)
    }

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 3, 0);
    }

    #[test]
    fn test_with_index_keeps_pixels() {
        let frame = gradient_frame(4, 4).with_index(9);
        assert_eq!(frame.index(), 9);
        assert_eq!(frame.data()[3], 1);
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        let mut data = vec![0u8; 12];
        data[6] = 255; // row=1, col=0, R
        let frame = Frame::new(data, 2, 2, 3, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
    }

    #[test]
    fn test_mean_intensity() {
        let frame = Frame::new(vec![10, 20, 30, 40, 50, 60], 2, 1, 3, 0);
        assert!((frame.mean_intensity() - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_luma_of_gray_pixels_is_identity() {
        let frame = gradient_frame(4, 4);
        let gray = frame.luma_of(&Region::new(1, 1, 2, 2));
        assert_eq!(gray, vec![5, 6, 9, 10]);
    }

    #[test]
    fn test_luma_weights_green_heaviest() {
        let red = Frame::new(vec![255, 0, 0], 1, 1, 3, 0);
        let green = Frame::new(vec![0, 255, 0], 1, 1, 3, 0);
        let full = Region::new(0, 0, 1, 1);
        assert!(green.luma_of(&full)[0] > red.luma_of(&full)[0]);
    }

    #[test]
    fn test_crop_extracts_rectangle() {
        let frame = gradient_frame(4, 4).with_index(3);
        let cropped = frame.crop(&Region::new(2, 1, 2, 3));
        assert_eq!(cropped.width(), 2);
        assert_eq!(cropped.height(), 3);
        assert_eq!(cropped.index(), 3);
        assert_eq!(cropped.as_ndarray()[[0, 0, 0]], 6);
        assert_eq!(cropped.as_ndarray()[[2, 1, 0]], 15);
    }
}
