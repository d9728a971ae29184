use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Error;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub pull: PullConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (logs of the interactive demo go here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Axis the pointer is read along
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

/// Motion engine configuration.
///
/// Immutable once handed to the engine; replace it wholesale through
/// `MotionEngine::set_config`, which re-validates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of slides/pages
    #[serde(default = "default_item_count")]
    pub item_count: usize,
    /// Index shown at construction (clamped or wrapped like `swipe_to`)
    #[serde(default)]
    pub default_index: i64,
    /// Wrap index space instead of bounding it
    #[serde(default, rename = "loop")]
    pub loop_mode: bool,
    /// Keep the track flush with the viewport edges at the first/last slide
    #[serde(default = "default_true")]
    pub stuck_at_boundary: bool,
    /// Resist (instead of hard stop) drags past the first/last slide
    #[serde(default = "default_true")]
    pub rubberband: bool,
    /// Accept pointer drags at all
    #[serde(default = "default_true")]
    pub allow_drag: bool,
    #[serde(default)]
    pub axis: Axis,
    /// Slide length as a fraction of the viewport, in (0, 1]
    #[serde(default = "default_slide_size_ratio")]
    pub slide_size_ratio: f64,
    /// Leading track offset as a fraction of the viewport, in [0, 1)
    #[serde(default)]
    pub track_offset_ratio: f64,
    #[serde(default)]
    pub spring: SpringParams,
    #[serde(default)]
    pub autoplay: AutoplayConfig,
    #[serde(default)]
    pub drag: DragParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            item_count: default_item_count(),
            default_index: 0,
            loop_mode: false,
            stuck_at_boundary: default_true(),
            rubberband: default_true(),
            allow_drag: default_true(),
            axis: Axis::default(),
            slide_size_ratio: default_slide_size_ratio(),
            track_offset_ratio: 0.0,
            spring: SpringParams::default(),
            autoplay: AutoplayConfig::default(),
            drag: DragParams::default(),
        }
    }
}

/// Damped oscillator parameters, in position units and seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringParams {
    #[serde(default = "default_mass")]
    pub mass: f64,
    #[serde(default = "default_stiffness")]
    pub stiffness: f64,
    #[serde(default = "default_damping")]
    pub damping: f64,
    /// Distance to target under which the spring may rest
    #[serde(default = "default_rest_displacement")]
    pub rest_displacement: f64,
    /// Speed (positions/s) under which the spring may rest
    #[serde(default = "default_rest_velocity")]
    pub rest_velocity: f64,
    /// Furthest the spring may travel past its target
    #[serde(default = "default_overshoot_limit")]
    pub overshoot_limit: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            mass: default_mass(),
            stiffness: default_stiffness(),
            damping: default_damping(),
            rest_displacement: default_rest_displacement(),
            rest_velocity: default_rest_velocity(),
            overshoot_limit: default_overshoot_limit(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoplayDirection {
    #[default]
    None,
    Forward,
    Reverse,
}

impl AutoplayDirection {
    /// Index step requested on each autoplay advance
    pub fn step(self) -> i64 {
        match self {
            AutoplayDirection::None => 0,
            AutoplayDirection::Forward => 1,
            AutoplayDirection::Reverse => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoplayConfig {
    #[serde(default)]
    pub direction: AutoplayDirection,
    /// Idle time between advances in milliseconds
    #[serde(default = "default_autoplay_interval")]
    pub interval_ms: u64,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            direction: AutoplayDirection::None,
            interval_ms: default_autoplay_interval(),
        }
    }
}

/// Drag release tuning. The defaults are empirical starting points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragParams {
    /// Seconds of release velocity added to the offset when predicting a target
    #[serde(default = "default_velocity_projection")]
    pub velocity_projection_secs: f64,
    /// Fraction of a slide that must be crossed on a slow release
    #[serde(default = "default_rounding_threshold")]
    pub rounding_threshold: f64,
    /// Release speeds (positions/s) below this use threshold rounding
    #[serde(default = "default_min_fling_velocity")]
    pub min_fling_velocity: f64,
    /// `k` in `1 / (1 + overscroll * k)`
    #[serde(default = "default_rubberband_factor")]
    pub rubberband_factor: f64,
    /// Samples older than this are ignored by the velocity estimate
    #[serde(default = "default_velocity_window")]
    pub velocity_window_ms: u64,
}

impl Default for DragParams {
    fn default() -> Self {
        Self {
            velocity_projection_secs: default_velocity_projection(),
            rounding_threshold: default_rounding_threshold(),
            min_fling_velocity: default_min_fling_velocity(),
            rubberband_factor: default_rubberband_factor(),
            velocity_window_ms: default_velocity_window(),
        }
    }
}

/// Pull-to-refresh indicator tuning, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PullConfig {
    /// Pull distance past which releasing triggers a refresh
    #[serde(default = "default_pull_threshold")]
    pub threshold_px: f64,
    /// Height the head rests at while refreshing
    #[serde(default = "default_head_height")]
    pub head_height_px: f64,
    /// How long the completed state is held before retracting
    #[serde(default = "default_complete_delay")]
    pub complete_delay_ms: u64,
    /// Resistance factor applied per pixel of pull
    #[serde(default = "default_pull_resistance")]
    pub rubberband_factor: f64,
    #[serde(default = "default_pull_spring")]
    pub spring: SpringParams,
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            threshold_px: default_pull_threshold(),
            head_height_px: default_head_height(),
            complete_delay_ms: default_complete_delay(),
            rubberband_factor: default_pull_resistance(),
            spring: default_pull_spring(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Frame interval in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Show the bottom status line
    #[serde(default = "default_true")]
    pub show_status_bar: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            show_status_bar: default_true(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("glide")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_item_count() -> usize {
    5
}

fn default_slide_size_ratio() -> f64 {
    1.0
}

fn default_mass() -> f64 {
    1.0
}

fn default_stiffness() -> f64 {
    200.0
}

fn default_damping() -> f64 {
    30.0 // slightly over critical for the default stiffness
}

fn default_rest_displacement() -> f64 {
    0.001
}

fn default_rest_velocity() -> f64 {
    0.01
}

fn default_overshoot_limit() -> f64 {
    0.05
}

fn default_autoplay_interval() -> u64 {
    3000
}

fn default_velocity_projection() -> f64 {
    2.0
}

fn default_rounding_threshold() -> f64 {
    0.5
}

fn default_min_fling_velocity() -> f64 {
    0.1
}

fn default_rubberband_factor() -> f64 {
    0.55
}

fn default_velocity_window() -> u64 {
    150
}

fn default_pull_threshold() -> f64 {
    60.0
}

fn default_head_height() -> f64 {
    40.0
}

fn default_complete_delay() -> u64 {
    500
}

fn default_pull_resistance() -> f64 {
    0.01
}

fn default_pull_spring() -> SpringParams {
    SpringParams {
        rest_displacement: 0.5,
        rest_velocity: 1.0,
        overshoot_limit: 0.0,
        ..SpringParams::default()
    }
}

fn default_tick_rate() -> u64 {
    16
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

fn check_finite(field: &'static str, value: f64) -> crate::Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid(field, format!("must be finite, got {}", value)))
    }
}

fn check_positive(field: &'static str, value: f64) -> crate::Result<()> {
    check_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(field, format!("must be > 0, got {}", value)))
    }
}

fn check_non_negative(field: &'static str, value: f64) -> crate::Result<()> {
    check_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(field, format!("must be >= 0, got {}", value)))
    }
}

impl SpringParams {
    pub fn validate(&self) -> crate::Result<()> {
        check_positive("spring.mass", self.mass)?;
        check_positive("spring.stiffness", self.stiffness)?;
        check_positive("spring.damping", self.damping)?;
        check_positive("spring.rest_displacement", self.rest_displacement)?;
        check_positive("spring.rest_velocity", self.rest_velocity)?;
        check_non_negative("spring.overshoot_limit", self.overshoot_limit)
    }

    /// Damping ratio; 1.0 is critical
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }
}

impl EngineConfig {
    /// Reject configurations the engine cannot run with.
    ///
    /// Programmer errors surface here rather than as runtime misbehaviour.
    pub fn validate(&self) -> crate::Result<()> {
        self.spring.validate()?;

        check_positive("slide_size_ratio", self.slide_size_ratio)?;
        if self.slide_size_ratio > 1.0 {
            return Err(Error::invalid(
                "slide_size_ratio",
                format!("must be <= 1, got {}", self.slide_size_ratio),
            ));
        }
        check_non_negative("track_offset_ratio", self.track_offset_ratio)?;
        if self.track_offset_ratio >= 1.0 {
            return Err(Error::invalid(
                "track_offset_ratio",
                format!("must be < 1, got {}", self.track_offset_ratio),
            ));
        }
        if self.stuck_at_boundary && self.slide_size_ratio + self.track_offset_ratio > 1.0 + 1e-9 {
            return Err(Error::invalid(
                "track_offset_ratio",
                format!(
                    "slide_size_ratio + track_offset_ratio must be <= 1 with stuck_at_boundary, got {} + {}",
                    self.slide_size_ratio, self.track_offset_ratio
                ),
            ));
        }

        let drag = &self.drag;
        check_non_negative("drag.velocity_projection_secs", drag.velocity_projection_secs)?;
        check_finite("drag.rounding_threshold", drag.rounding_threshold)?;
        if drag.rounding_threshold <= 0.0 || drag.rounding_threshold >= 1.0 {
            return Err(Error::invalid(
                "drag.rounding_threshold",
                format!("must be in (0, 1), got {}", drag.rounding_threshold),
            ));
        }
        check_non_negative("drag.min_fling_velocity", drag.min_fling_velocity)?;
        check_positive("drag.rubberband_factor", drag.rubberband_factor)?;
        if drag.velocity_window_ms == 0 {
            return Err(Error::invalid("drag.velocity_window_ms", "must be > 0"));
        }

        if self.autoplay.direction != AutoplayDirection::None && self.autoplay.interval_ms == 0 {
            return Err(Error::invalid(
                "autoplay.interval_ms",
                "must be > 0 when autoplay is enabled",
            ));
        }

        Ok(())
    }
}

impl PullConfig {
    pub fn validate(&self) -> crate::Result<()> {
        check_positive("pull.threshold_px", self.threshold_px)?;
        check_positive("pull.head_height_px", self.head_height_px)?;
        check_positive("pull.rubberband_factor", self.rubberband_factor)?;
        self.spring.validate()
    }
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, falling back to defaults when absent
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.engine.validate()?;
        self.pull.validate()
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/glide/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("glide")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Log file used while the terminal is in raw mode
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("glide.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.item_count, 5);
        assert_eq!(config.engine.drag.rounding_threshold, 0.5);
        assert_eq!(config.engine.autoplay.direction, AutoplayDirection::None);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [engine]
            item_count = 3
            loop = true

            [engine.autoplay]
            direction = "forward"
            interval_ms = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.item_count, 3);
        assert!(config.engine.loop_mode);
        assert_eq!(config.engine.autoplay.direction, AutoplayDirection::Forward);
        assert_eq!(config.engine.spring, SpringParams::default());
        assert_eq!(config.ui.tick_rate_ms, 16);
    }

    #[test]
    fn test_toml_round_trip_preserves_engine() {
        let mut config = AppConfig::default();
        config.engine.axis = Axis::Vertical;
        config.engine.slide_size_ratio = 0.8;
        let text = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.engine, config.engine);
    }

    #[test]
    fn test_rejects_non_positive_spring() {
        let mut config = EngineConfig::default();
        config.spring.stiffness = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("spring.stiffness"), "{}", err);

        config.spring.stiffness = 200.0;
        config.spring.mass = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("spring.mass"), "{}", err);
    }

    #[test]
    fn test_rejects_bad_ratios_and_threshold() {
        let mut config = EngineConfig::default();
        config.slide_size_ratio = 1.5;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.track_offset_ratio = 1.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.drag.rounding_threshold = 1.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.spring.damping = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_offset_pushing_last_slide_past_track() {
        let mut config = EngineConfig {
            slide_size_ratio: 0.8,
            track_offset_ratio: 0.5,
            ..EngineConfig::default()
        };
        match config.validate() {
            Err(Error::InvalidConfig { field, .. }) => assert_eq!(field, "track_offset_ratio"),
            other => panic!("expected invalid track_offset_ratio, got {:?}", other),
        }

        config.track_offset_ratio = 0.2;
        assert!(config.validate().is_ok());

        // Without stuck boundaries the slides simply overhang the viewport
        config.track_offset_ratio = 0.5;
        config.stuck_at_boundary = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_autoplay_interval_only_when_enabled() {
        let mut config = EngineConfig::default();
        config.autoplay.interval_ms = 0;
        assert!(config.validate().is_ok());

        config.autoplay.direction = AutoplayDirection::Reverse;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = AppConfig::from_toml("[engine\nitem_count = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_save_to_and_load_from() {
        let dir = std::env::temp_dir().join(format!("glide-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.engine.item_count = 9;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.engine.item_count, 9);

        let missing = AppConfig::load_from(&dir.join("absent.toml")).unwrap();
        assert_eq!(missing.engine.item_count, 5);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_damping_ratio() {
        let params = SpringParams {
            mass: 1.0,
            stiffness: 100.0,
            damping: 20.0,
            ..SpringParams::default()
        };
        assert!((params.damping_ratio() - 1.0).abs() < 1e-12);
    }
}
