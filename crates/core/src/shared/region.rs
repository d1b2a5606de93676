use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in native (unscaled) pixel coordinates.
///
/// Used both as a crop target and as a watermark location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// True when the region is non-empty and lies fully inside a
    /// `width x height` frame.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        !self.is_empty()
            && self.x >= 0
            && self.y >= 0
            && self.x as i64 + self.width as i64 <= width as i64
            && self.y as i64 + self.height as i64 <= height as i64
    }

    /// Intersection with a `width x height` frame, or `None` when nothing
    /// of the region is visible.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Region> {
        let x1 = self.x.max(0) as i64;
        let y1 = self.y.max(0) as i64;
        let x2 = (self.x as i64 + self.width as i64).min(width as i64);
        let y2 = (self.y as i64 + self.height as i64).min(height as i64);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Region::new(
            x1 as i32,
            y1 as i32,
            (x2 - x1) as i32,
            (y2 - y1) as i32,
        ))
    }

    pub fn offset_by(&self, dx: i32, dy: i32) -> Region {
        Region::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Maps preview coordinates back to native ones.
    ///
    /// `scale` is `preview_height / native_height`; coordinates truncate
    /// toward zero like the selection UI reports them.
    pub fn from_preview(&self, scale: f64) -> Region {
        let unscale = |v: i32| (v as f64 / scale) as i32;
        Region::new(
            unscale(self.x),
            unscale(self.y),
            unscale(self.width),
            unscale(self.height),
        )
    }

    /// Proportionally maps a region defined on a `from` sized frame onto a
    /// `to` sized frame.
    pub fn rescale(&self, from: (u32, u32), to: (u32, u32)) -> Region {
        if from == to || from.0 == 0 || from.1 == 0 {
            return *self;
        }
        let sx = |v: i32| (v as i64 * to.0 as i64 / from.0 as i64) as i32;
        let sy = |v: i32| (v as i64 * to.1 as i64 / from.1 as i64) as i32;
        Region::new(sx(self.x), sy(self.y), sx(self.width), sy(self.height))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

impl FromStr for Region {
    type Err = String;

    /// Parses `x,y,width,height`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(format!("expected x,y,width,height, got '{s}'"));
        }
        let mut values = [0i32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| format!("invalid coordinate '{part}' in '{s}'"))?;
        }
        Ok(Region::new(values[0], values[1], values[2], values[3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_area_and_empty() {
        assert_eq!(Region::new(0, 0, 10, 20).area(), 200);
        assert!(Region::new(0, 0, 0, 20).is_empty());
        assert!(Region::new(0, 0, 10, -1).is_empty());
        assert_eq!(Region::new(0, 0, -5, 20).area(), 0);
    }

    #[rstest]
    #[case::inside(Region::new(10, 10, 50, 50), true)]
    #[case::exact_fit(Region::new(0, 0, 100, 100), true)]
    #[case::overflows_right(Region::new(60, 0, 50, 50), false)]
    #[case::negative_origin(Region::new(-1, 0, 50, 50), false)]
    #[case::zero_width(Region::new(0, 0, 0, 50), false)]
    fn test_fits_within(#[case] region: Region, #[case] expected: bool) {
        assert_eq!(region.fits_within(100, 100), expected);
    }

    #[test]
    fn test_clamp_to_inside_is_unchanged() {
        let r = Region::new(10, 10, 20, 20);
        assert_eq!(r.clamp_to(100, 100), Some(r));
    }

    #[test]
    fn test_clamp_to_trims_overflow() {
        let r = Region::new(-10, 90, 50, 50);
        assert_eq!(r.clamp_to(100, 100), Some(Region::new(0, 90, 40, 10)));
    }

    #[test]
    fn test_clamp_to_outside_is_none() {
        assert_eq!(Region::new(200, 200, 10, 10).clamp_to(100, 100), None);
        assert_eq!(Region::new(0, 0, 0, 10).clamp_to(100, 100), None);
    }

    #[test]
    fn test_from_preview_scales_up() {
        // 1080p source shown at 720 → scale 2/3
        let preview = Region::new(100, 50, 200, 100);
        let native = preview.from_preview(720.0 / 1080.0);
        assert_eq!(native, Region::new(150, 75, 300, 150));
    }

    #[test]
    fn test_from_preview_truncates() {
        let native = Region::new(1, 1, 1, 1).from_preview(720.0 / 1000.0);
        assert_eq!(native, Region::new(1, 1, 1, 1));
    }

    #[test]
    fn test_rescale_proportional() {
        let r = Region::new(100, 50, 200, 100);
        assert_eq!(
            r.rescale((1920, 1080), (960, 540)),
            Region::new(50, 25, 100, 50)
        );
        assert_eq!(r.rescale((1920, 1080), (1920, 1080)), r);
    }

    #[test]
    fn test_offset_by() {
        assert_eq!(
            Region::new(1, 2, 3, 4).offset_by(10, 20),
            Region::new(11, 22, 3, 4)
        );
    }

    #[test]
    fn test_parse_and_display() {
        let r: Region = " 10, 20,30 ,40".parse().unwrap();
        assert_eq!(r, Region::new(10, 20, 30, 40));
        assert_eq!(r.to_string(), "10,20,30,40");
    }

    #[rstest]
    #[case("1,2,3")]
    #[case("1,2,3,4,5")]
    #[case("a,2,3,4")]
    #[case("")]
    fn test_parse_rejects_malformed(#[case] input: &str) {
        assert!(input.parse::<Region>().is_err());
    }
}
