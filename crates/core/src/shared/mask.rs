pub const MASK_ON: u8 = 255;
pub const MASK_OFF: u8 = 0;

/// Single-channel removal mask, same size as the frames it applies to.
///
/// Every value is either [`MASK_ON`] or [`MASK_OFF`]. A mask is built once
/// and never mutated afterwards; derived sizes produce a new mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Mask {
    pub fn zeros(width: u32, height: u32) -> Self {
        Self {
            data: vec![MASK_OFF; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Builds a mask from raw bytes; any non-zero byte counts as set.
    pub fn from_raw(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            width as usize * height as usize,
            "mask length must equal width * height"
        );
        let data = data
            .into_iter()
            .map(|v| if v != 0 { MASK_ON } else { MASK_OFF })
            .collect();
        Self {
            data,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.data[y as usize * self.width as usize + x as usize] == MASK_ON
    }

    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|&&v| v == MASK_ON).count()
    }

    /// True when no pixel is marked for removal.
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&v| v == MASK_OFF)
    }

    /// Nearest-neighbour resample, used when a batch mixes frame sizes.
    pub fn resized(&self, width: u32, height: u32) -> Mask {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height as u64 {
            let sy = (y * self.height as u64 / height.max(1) as u64) as usize;
            for x in 0..width as u64 {
                let sx = (x * self.width as u64 / width.max(1) as u64) as usize;
                data.push(self.data[sy * self.width as usize + sx]);
            }
        }
        Mask {
            data,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_is_blank() {
        let mask = Mask::zeros(4, 3);
        assert!(mask.is_blank());
        assert_eq!(mask.data().len(), 12);
        assert_eq!(mask.count_set(), 0);
    }

    #[test]
    fn test_from_raw_binarizes() {
        let mask = Mask::from_raw(vec![0, 1, 200, 0], 2, 2);
        assert_eq!(mask.data(), &[0, 255, 255, 0]);
        assert!(mask.is_set(1, 0));
        assert!(!mask.is_set(1, 1));
        assert_eq!(mask.count_set(), 2);
    }

    #[test]
    fn test_resized_doubles_pixels() {
        let mask = Mask::from_raw(vec![1, 0, 0, 0], 2, 2);
        let big = mask.resized(4, 4);
        assert_eq!(big.count_set(), 4);
        assert!(big.is_set(0, 0));
        assert!(big.is_set(1, 1));
        assert!(!big.is_set(2, 0));
    }

    #[test]
    fn test_resized_same_size_is_equal() {
        let mask = Mask::from_raw(vec![1, 0, 1, 0], 2, 2);
        assert_eq!(mask.resized(2, 2), mask);
    }
}
