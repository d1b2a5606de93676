use crate::stages::looper::LoopedClip;

/// Plays the finished stream faster or slower at an unchanged frame rate.
///
/// A factor of 2 drops every other frame and halves the duration; 0.5
/// shows every frame twice. Frames are picked, never blended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedChanger {
    factor: f64,
}

impl SpeedChanger {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }

    /// Output name token, e.g. `_speed_1.25x` or `_speed_2.0x`.
    pub fn suffix(&self) -> String {
        if self.factor.fract() == 0.0 {
            format!("_speed_{:.1}x", self.factor)
        } else {
            format!("_speed_{}x", self.factor)
        }
    }

    /// Frames shown when `frame_count` frames are played at this speed.
    /// A non-empty stream keeps at least one frame.
    pub fn retimed_count(&self, frame_count: usize) -> usize {
        if frame_count == 0 {
            return 0;
        }
        ((frame_count as f64 / self.factor).round() as usize).max(1)
    }

    pub fn apply<'a>(&self, clip: LoopedClip<'a>) -> LoopedClip<'a> {
        if !(self.factor > 0.0) || self.factor == 1.0 {
            return clip;
        }
        let count = self.retimed_count(clip.frame_count());
        log::debug!(
            "Changing speed by {}x: {} frames become {count}",
            self.factor,
            clip.frame_count()
        );
        clip.retimed(self.factor, count)
    }
}
