use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::inpainting::domain::frame_inpainter::InpaintMode;
use crate::shared::constants::{
    DEFAULT_CODEC, DEFAULT_INPAINT_RADIUS, DEFAULT_MIN_VOTE_COUNT, DEFAULT_OUTPUT_EXTENSION,
    DEFAULT_SAMPLE_FRAMES,
};
use crate::shared::error::PipelineError;
use crate::shared::region::Region;

/// Where a stage gets its rectangles from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RegionSource {
    /// Ask the region selector once per batch (`auto`).
    Select,
    /// Native-resolution rectangles known up front.
    Fixed(Vec<Region>),
}

impl fmt::Display for RegionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionSource::Select => write!(f, "auto"),
            RegionSource::Fixed(regions) => {
                let parts: Vec<String> = regions.iter().map(Region::to_string).collect();
                write!(f, "{}", parts.join(";"))
            }
        }
    }
}

impl FromStr for RegionSource {
    type Err = String;

    /// Accepts `auto` or `x,y,w,h` rectangles separated by `;`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(RegionSource::Select);
        }
        s.split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Region>, _>>()
            .map(RegionSource::Fixed)
    }
}

impl TryFrom<String> for RegionSource {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RegionSource> for String {
    fn from(source: RegionSource) -> Self {
        source.to_string()
    }
}

/// Output frame size for the resize finishing step, written `WxH`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OutputSize {
    pub width: u32,
    pub height: u32,
}

impl OutputSize {
    pub fn suffix(&self) -> String {
        format!("_{self}")
    }
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for OutputSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| format!("bad size '{s}': {e}"))
        };
        Ok(OutputSize {
            width: parse(w)?,
            height: parse(h)?,
        })
    }
}

impl TryFrom<String> for OutputSize {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OutputSize> for String {
    fn from(size: OutputSize) -> Self {
        size.to_string()
    }
}

/// Optional steps applied to the finished stream. Unlike stages they do not
/// advance the per-video state; their suffixes follow the stage suffixes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinishConfig {
    /// Scale every output frame to this size.
    pub resize: Option<OutputSize>,
    /// Playback speed factor; 2.0 halves the duration.
    pub speed: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    pub skip_start: f64,
    pub skip_end: f64,
    pub max_duration: Option<f64>,
}

/// Per-stage switches. A stage is enabled when its entry is present
/// (loop: when the target is positive).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub trim: Option<TrimConfig>,
    pub crop: Option<RegionSource>,
    pub watermark: Option<RegionSource>,
    pub loop_duration: Option<f64>,
}

impl StageConfig {
    pub fn trim_enabled(&self) -> bool {
        self.trim.is_some()
    }

    pub fn crop_enabled(&self) -> bool {
        self.crop.is_some()
    }

    pub fn watermark_enabled(&self) -> bool {
        self.watermark.is_some()
    }

    pub fn loop_enabled(&self) -> bool {
        self.loop_duration.is_some_and(|d| d > 0.0)
    }

    pub fn any_enabled(&self) -> bool {
        self.trim_enabled()
            || self.crop_enabled()
            || self.watermark_enabled()
            || self.loop_enabled()
    }
}

/// Everything a batch run needs, fixed for its whole duration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub stages: StageConfig,
    pub finish: FinishConfig,
    pub sample_frames: usize,
    pub min_vote_count: usize,
    pub inpaint_radius: u32,
    pub inpaint_mode: InpaintMode,
    pub codec: String,
    pub output_extension: String,
    /// Frame cap applied to the clip before cropping and watermark removal.
    pub max_frames: Option<usize>,
    /// Ask for regions and rebuild the mask for every video instead of
    /// reusing the first video's.
    pub reselect_per_video: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stages: StageConfig::default(),
            finish: FinishConfig::default(),
            sample_frames: DEFAULT_SAMPLE_FRAMES,
            min_vote_count: DEFAULT_MIN_VOTE_COUNT,
            inpaint_radius: DEFAULT_INPAINT_RADIUS,
            inpaint_mode: InpaintMode::default(),
            codec: DEFAULT_CODEC.to_string(),
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
            max_frames: None,
            reselect_per_video: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(json)
            .map_err(|e| PipelineError::configuration(format!("invalid config JSON: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let json = fs::read_to_string(path).map_err(|e| {
            PipelineError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, PipelineError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PipelineError::configuration(format!("cannot serialize config: {e}")))
    }

    /// Rejects settings no video could be processed with.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let fail = |msg: String| Err(PipelineError::configuration(msg));

        if let Some(trim) = &self.stages.trim {
            for (name, value) in [("skip_start", trim.skip_start), ("skip_end", trim.skip_end)] {
                if !value.is_finite() || value < 0.0 {
                    return fail(format!("{name} must be a non-negative number, got {value}"));
                }
            }
            if let Some(max) = trim.max_duration {
                if !max.is_finite() || max <= 0.0 {
                    return fail(format!("max_duration must be positive, got {max}"));
                }
            }
        }

        if let Some(target) = self.stages.loop_duration {
            if !target.is_finite() {
                return fail(format!("loop_duration must be finite, got {target}"));
            }
        }

        for (stage, source) in [("crop", &self.stages.crop), ("watermark", &self.stages.watermark)] {
            if let Some(RegionSource::Fixed(regions)) = source {
                if let Some(bad) = regions.iter().find(|r| r.is_empty() || r.x < 0 || r.y < 0) {
                    return fail(format!(
                        "{stage} region {bad} must have a non-negative origin and positive size"
                    ));
                }
            }
        }

        if let Some(size) = self.finish.resize {
            if size.width < 2 || size.height < 2 {
                return fail(format!("resize target {size} must be at least 2x2"));
            }
        }
        if let Some(speed) = self.finish.speed {
            if !speed.is_finite() || speed <= 0.0 {
                return fail(format!("speed must be a positive number, got {speed}"));
            }
        }

        if self.sample_frames == 0 {
            return fail("sample_frames must be at least 1".to_string());
        }
        if self.min_vote_count == 0 || self.min_vote_count > self.sample_frames {
            return fail(format!(
                "min_vote_count must be between 1 and sample_frames ({}), got {}",
                self.sample_frames, self.min_vote_count
            ));
        }
        if self.max_frames == Some(0) {
            return fail("max_frames must be at least 1".to_string());
        }
        if self.codec.trim().is_empty() {
            return fail("codec must not be empty".to_string());
        }
        if self.output_extension.trim().is_empty() || self.output_extension.contains('.') {
            return fail(format!(
                "output_extension must be a bare extension like 'mp4', got '{}'",
                self.output_extension
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.sample_frames, 10);
        assert_eq!(config.min_vote_count, 7);
        assert_eq!(config.inpaint_radius, 3);
        assert_eq!(config.codec, "libx264");
        assert_eq!(config.output_extension, "mp4");
        assert!(!config.stages.any_enabled());
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case("auto", RegionSource::Select)]
    #[case("AUTO", RegionSource::Select)]
    #[case("1,2,3,4", RegionSource::Fixed(vec![Region::new(1, 2, 3, 4)]))]
    #[case(
        "1,2,3,4; 5,6,7,8;",
        RegionSource::Fixed(vec![Region::new(1, 2, 3, 4), Region::new(5, 6, 7, 8)])
    )]
    #[case("", RegionSource::Fixed(vec![]))]
    fn test_region_source_parse(#[case] input: &str, #[case] expected: RegionSource) {
        assert_eq!(input.parse::<RegionSource>().unwrap(), expected);
    }

    #[test]
    fn test_region_source_rejects_garbage() {
        assert!("1,2,3".parse::<RegionSource>().is_err());
        assert!("left".parse::<RegionSource>().is_err());
    }

    #[test]
    fn test_json_roundtrip_and_partial_files() {
        let json = r#"{
            "stages": {
                "trim": { "skip_start": 5.0, "skip_end": 10.0, "max_duration": 120.0 },
                "crop": "0,0,100,100;10,10,50,50",
                "watermark": "auto",
                "loop_duration": 250.0
            },
            "min_vote_count": 5,
            "inpaint_mode": "telea"
        }"#;
        let config = PipelineConfig::from_json(json).unwrap();
        assert!(config.stages.trim_enabled());
        assert_eq!(config.stages.watermark, Some(RegionSource::Select));
        assert_eq!(
            config.stages.crop,
            Some(RegionSource::Fixed(vec![
                Region::new(0, 0, 100, 100),
                Region::new(10, 10, 50, 50)
            ]))
        );
        assert_eq!(config.min_vote_count, 5);
        assert_eq!(config.sample_frames, 10);
        assert_eq!(config.inpaint_mode, InpaintMode::Telea);

        let again = PipelineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn test_load_missing_file_is_configuration_error() {
        let err = PipelineConfig::load(Path::new("/nonexistent/vidpipe.json")).unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "codec": "mpeg4", "reselect_per_video": true }"#).unwrap();
        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.codec, "mpeg4");
        assert!(config.reselect_per_video);
    }

    #[test]
    fn test_loop_enabled_only_for_positive_target() {
        let mut stages = StageConfig::default();
        stages.loop_duration = Some(0.0);
        assert!(!stages.loop_enabled());
        stages.loop_duration = Some(12.5);
        assert!(stages.loop_enabled());
    }

    fn with_trim(skip_start: f64, skip_end: f64, max_duration: Option<f64>) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.stages.trim = Some(TrimConfig {
            skip_start,
            skip_end,
            max_duration,
        });
        config
    }

    #[rstest]
    #[case::negative_start(with_trim(-1.0, 0.0, None))]
    #[case::nan_end(with_trim(0.0, f64::NAN, None))]
    #[case::zero_max(with_trim(0.0, 0.0, Some(0.0)))]
    fn test_validate_rejects_bad_trim(#[case] config: PipelineConfig) {
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_votes() {
        let mut config = PipelineConfig::default();
        config.min_vote_count = 11;
        assert!(config.validate().is_err());
        config.min_vote_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_fixed_region() {
        let mut config = PipelineConfig::default();
        config.stages.crop = Some(RegionSource::Fixed(vec![Region::new(0, 0, 0, 10)]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_max_frames_and_dotted_extension() {
        let mut config = PipelineConfig::default();
        config.max_frames = Some(0);
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.output_extension = ".mp4".to_string();
        assert!(config.validate().is_err());
    }

    #[rstest]
    #[case("640x480", 640, 480)]
    #[case(" 1280X720 ", 1280, 720)]
    fn test_output_size_parse(#[case] input: &str, #[case] width: u32, #[case] height: u32) {
        assert_eq!(input.parse::<OutputSize>().unwrap(), OutputSize { width, height });
    }

    #[rstest]
    #[case("640")]
    #[case("640x")]
    #[case("-1x20")]
    fn test_output_size_rejects_garbage(#[case] input: &str) {
        assert!(input.parse::<OutputSize>().is_err());
    }

    #[test]
    fn test_finish_options_from_json() {
        let config =
            PipelineConfig::from_json(r#"{ "finish": { "resize": "640x480", "speed": 1.25 } }"#)
                .unwrap();
        assert_eq!(
            config.finish.resize,
            Some(OutputSize {
                width: 640,
                height: 480
            })
        );
        assert_eq!(config.finish.speed, Some(1.25));
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case(Some(OutputSize { width: 1, height: 480 }), None)]
    #[case(None, Some(0.0))]
    #[case(None, Some(f64::INFINITY))]
    fn test_validate_rejects_bad_finish(
        #[case] resize: Option<OutputSize>,
        #[case] speed: Option<f64>,
    ) {
        let mut config = PipelineConfig::default();
        config.finish = FinishConfig { resize, speed };
        assert!(config.validate().is_err());
    }
}
