//! Configuration management for neonscan
//!
//! Every tunable lives in [`AppConfig`]. A TOML file may override any subset of
//! it; missing sections and keys keep their defaults.

use crate::backdrop::BackdropKind;
use crate::error::{NeonError, Result};
use crate::graphics::Rgb;
use crate::nav::{ViewGroup, ViewKind};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Grid density selected by viewport width
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DensityTier {
    pub rows: usize,
    pub cols: usize,
    pub separation: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Logical units covered by one canvas pixel
    pub units_per_pixel: f64,
    pub background: Rgb,
    /// Effect shown at startup unless the command line picks one
    pub backdrop: BackdropKind,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            units_per_pixel: 4.0,
            background: Rgb::new(5, 6, 10),
            backdrop: BackdropKind::Wave,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    pub coarse: DensityTier,
    pub fine: DensityTier,
    /// Viewport widths below this use the coarse tier
    pub breakpoint: f64,
    pub wave_speed: f64,
    pub wave_height: f64,
    pub secondary_height: f64,
    pub fov: f64,
    pub camera_distance: f64,
    pub max_yaw: f64,
    pub smoothing: f64,
    /// Vertical shift per unit of pointer Y
    pub tilt: f64,
    /// Distance of the field's baseline below the vertical centre
    pub base_offset: f64,
    pub base_radius: f64,
    pub color: Rgb,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            coarse: DensityTier {
                rows: 30,
                cols: 20,
                separation: 30.0,
            },
            fine: DensityTier {
                rows: 60,
                cols: 60,
                separation: 40.0,
            },
            breakpoint: 768.0,
            wave_speed: 0.02,
            wave_height: 60.0,
            secondary_height: 30.0,
            fov: 400.0,
            camera_distance: 800.0,
            max_yaw: 0.5,
            smoothing: 0.05,
            tilt: 50.0,
            base_offset: 100.0,
            base_radius: 2.5,
            color: Rgb::new(0x4f, 0x46, 0xe5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HorizonConfig {
    pub bands: usize,
    pub cell_size: f64,
    /// Forward motion per frame
    pub speed: f64,
    /// Pulse clock advance per frame
    pub time_step: f64,
    /// Horizon position as a fraction of the viewport height
    pub horizon_ratio: f64,
    /// Fraction of the page scroll applied as vertical offset
    pub parallax: f64,
    pub base_alpha: f64,
    /// Converging lines running towards the vanishing point
    pub lanes: usize,
    pub color: Rgb,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            bands: 20,
            cell_size: 40.0,
            speed: 0.5,
            time_step: 0.016,
            horizon_ratio: 0.45,
            parallax: 0.3,
            base_alpha: 0.6,
            lanes: 18,
            color: Rgb::new(0xff, 0x00, 0xaa),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StarsConfig {
    pub count: usize,
    /// Each velocity component is drawn from ±max_speed
    pub max_speed: f64,
    pub max_radius: f64,
    pub max_alpha: f64,
    pub link_distance: f64,
    pub link_alpha: f64,
    pub color: Rgb,
}

impl Default for StarsConfig {
    fn default() -> Self {
        Self {
            count: 100,
            max_speed: 0.25,
            max_radius: 2.0,
            max_alpha: 0.5,
            link_distance: 100.0,
            link_alpha: 0.05,
            color: Rgb::new(0x00, 0xff, 0x9d),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Simulated analysis latency before the report appears
    pub latency_ms: u64,
    /// Interval between revealed characters
    pub tick_ms: u64,
    /// Delay after the reveal starts before the request is logged
    pub log_delay_ms: u64,
    /// Delay between the request entry and the response entry
    pub response_delay_ms: u64,
    /// Any of these (case-insensitive) marks the input as suspicious
    pub keywords: Vec<String>,
    /// Characters of the input echoed in the report
    pub echo_chars: usize,
    /// Characters of the input kept in the log entry
    pub log_chars: usize,
    pub suspicious_score: [u8; 2],
    pub normal_score: [u8; 2],
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            latency_ms: 2000,
            tick_ms: 30,
            log_delay_ms: 600,
            response_delay_ms: 400,
            keywords: [
                "drop",
                "delete",
                "ignore previous",
                "truncate",
                "rm -rf",
                "shutdown",
                "exec",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            echo_chars: 20,
            log_chars: 32,
            suspicious_score: [75, 99],
            normal_score: [3, 24],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Value the event counter starts from
    pub initial_count: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            initial_count: 2048,
        }
    }
}

/// One entry of the navigation table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ViewConfig {
    pub id: String,
    pub label: String,
    pub group: ViewGroup,
    /// Tool hosted by an application view
    #[serde(default)]
    pub kind: ViewKind,
    #[serde(default)]
    pub headline: String,
}

impl ViewConfig {
    fn new(id: &str, label: &str, group: ViewGroup, headline: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            group,
            kind: ViewKind::Page,
            headline: headline.to_string(),
        }
    }

    fn tool(id: &str, label: &str, kind: ViewKind) -> Self {
        Self {
            kind,
            ..Self::new(id, label, ViewGroup::Application, "")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub default_view: String,
    pub views: Vec<ViewConfig>,
    pub app_primary: Rgb,
    pub app_secondary: Rgb,
    pub info_primary: Rgb,
    pub info_secondary: Rgb,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            default_view: "home".to_string(),
            views: vec![
                ViewConfig::new(
                    "home",
                    "HOME",
                    ViewGroup::Informational,
                    "SEE THE THREAT BEFORE IT SEES YOU",
                ),
                ViewConfig::new(
                    "features",
                    "FEATURES",
                    ViewGroup::Informational,
                    "HEURISTICS / SIGNATURES / LIVE FEED",
                ),
                ViewConfig::new(
                    "about",
                    "ABOUT",
                    ViewGroup::Informational,
                    "BUILT FOR OPERATORS WHO NEVER SLEEP",
                ),
                ViewConfig::tool("scanner", "SCANNER", ViewKind::Scanner),
                ViewConfig::tool("logs", "LOGS", ViewKind::Logs),
            ],
            app_primary: Rgb::new(0xff, 0x00, 0x55),
            app_secondary: Rgb::new(0xff, 0xcc, 0x00),
            info_primary: Rgb::new(0x00, 0xff, 0x9d),
            info_secondary: Rgb::new(0x00, 0xbc, 0xd4),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub canvas: CanvasConfig,
    pub wave: WaveConfig,
    pub horizon: HorizonConfig,
    pub stars: StarsConfig,
    pub scan: ScanConfig,
    pub feed: FeedConfig,
    pub navigation: NavigationConfig,
}

impl AppConfig {
    /// Parses a TOML document over the defaults and validates the result
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the renderers and the scan flow cannot work with
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(NeonError::Config(msg));

        if !(self.canvas.units_per_pixel > 0.0) {
            return fail("canvas.units_per_pixel must be positive".into());
        }
        for (name, tier) in [("coarse", self.wave.coarse), ("fine", self.wave.fine)] {
            if tier.rows == 0 || tier.cols == 0 || !(tier.separation > 0.0) {
                return fail(format!("wave.{name} needs non-zero rows, cols and separation"));
            }
        }
        if !(self.wave.fov > 0.0) || self.wave.camera_distance < 0.0 {
            return fail("wave.fov must be positive and wave.camera_distance non-negative".into());
        }
        if !(0.0..=1.0).contains(&self.wave.smoothing) {
            return fail("wave.smoothing must be within [0, 1]".into());
        }
        if self.horizon.bands == 0 || !(self.horizon.cell_size > 0.0) {
            return fail("horizon.bands and horizon.cell_size must be positive".into());
        }
        if !(0.0..1.0).contains(&self.horizon.horizon_ratio) {
            return fail("horizon.horizon_ratio must be within [0, 1)".into());
        }
        if self.scan.keywords.iter().any(|k| k.trim().is_empty()) {
            return fail("scan.keywords must not contain blank entries".into());
        }
        if self.scan.tick_ms == 0 {
            return fail("scan.tick_ms must be at least 1".into());
        }
        for (name, [low, high]) in [
            ("suspicious_score", self.scan.suspicious_score),
            ("normal_score", self.scan.normal_score),
        ] {
            if low > high || high > 100 {
                return fail(format!("scan.{name} must be an ascending range within 0..=100"));
            }
        }

        let views = &self.navigation.views;
        if views.is_empty() {
            return fail("navigation.views must not be empty".into());
        }
        let mut seen = HashSet::new();
        for view in views {
            if !seen.insert(view.id.as_str()) {
                return fail(format!("duplicate view id '{}'", view.id));
            }
            if view.kind != ViewKind::Page && view.group != ViewGroup::Application {
                return fail(format!(
                    "view '{}' hosts a tool and must be in the application group",
                    view.id
                ));
            }
        }
        if !seen.contains(self.navigation.default_view.as_str()) {
            return fail(format!(
                "default view '{}' is not in navigation.views",
                self.navigation.default_view
            ));
        }
        Ok(())
    }
}

/// Loads configuration from a TOML file and merges it with defaults
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(NeonError::Io)?;
    let config = AppConfig::from_toml_str(&content)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}
