use crate::shared::video_asset::VideoAsset;

/// Half-open range of stream frame numbers worth keeping while decoding.
///
/// Frames outside the window are decoded (the container has to be read in
/// order) but dropped immediately instead of being buffered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameWindow {
    pub start: usize,
    /// Exclusive end; `None` keeps everything from `start` on.
    pub end: Option<usize>,
}

impl FrameWindow {
    pub const ALL: FrameWindow = FrameWindow {
        start: 0,
        end: None,
    };

    pub fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, frame: usize) -> bool {
        frame >= self.start && self.end.map_or(true, |end| frame < end)
    }

    /// Narrows the window to at most `count` frames from its start.
    pub fn limited_to(self, count: usize) -> Self {
        let cap = self.start.saturating_add(count);
        Self {
            start: self.start,
            end: Some(self.end.map_or(cap, |end| end.min(cap))),
        }
    }
}

/// Frames kept from a windowed decode, plus what was seen of the stream.
#[derive(Debug)]
pub struct WindowedClip {
    /// Kept frames, renumbered from 0.
    pub asset: VideoAsset,
    /// Stream frame number of `asset`'s first frame.
    pub offset: usize,
    /// Frames decoded from the whole stream, kept or not.
    pub source_frames: usize,
}

impl WindowedClip {
    /// A clip whose every frame was kept.
    pub fn whole(asset: VideoAsset) -> Self {
        let source_frames = asset.frame_count();
        Self {
            asset,
            offset: 0,
            source_frames,
        }
    }

    /// Duration of the full source stream.
    pub fn source_duration(&self) -> f64 {
        let fps = self.asset.fps();
        if fps <= 0.0 {
            return 0.0;
        }
        self.source_frames as f64 / fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::video_asset::test_support::make_asset;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(FrameWindow::ALL, 0, true)]
    #[case(FrameWindow::ALL, 10_000, true)]
    #[case(FrameWindow::new(5, Some(8)), 4, false)]
    #[case(FrameWindow::new(5, Some(8)), 5, true)]
    #[case(FrameWindow::new(5, Some(8)), 8, false)]
    #[case(FrameWindow::new(5, None), 900, true)]
    fn test_contains(#[case] window: FrameWindow, #[case] frame: usize, #[case] expected: bool) {
        assert_eq!(window.contains(frame), expected);
    }

    #[test]
    fn test_limited_to_takes_tighter_end() {
        assert_eq!(FrameWindow::new(10, None).limited_to(5), FrameWindow::new(10, Some(15)));
        assert_eq!(
            FrameWindow::new(10, Some(12)).limited_to(5),
            FrameWindow::new(10, Some(12))
        );
    }

    #[test]
    fn test_whole_clip_reports_full_duration() {
        let clip = WindowedClip::whole(make_asset(25, 10.0, 1, 1));
        assert_eq!(clip.source_frames, 25);
        assert_relative_eq!(clip.source_duration(), 2.5);
    }
}
