//! 3D sine-wave particle field.
//!
//! A flat grid of points is displaced by two superposed sine waves, yawed by the
//! pointer and projected with a fixed perspective camera. Distant points fade
//! out and are culled once fully transparent.

use crate::config::{DensityTier, WaveConfig};
use crate::graphics::Canvas;
use crate::math::{approach, multiply_matrix_vector, perspective_scale, rotation_y, wave_height};
use crate::state::{FrameInput, RenderState};
use crate::vertex::{GridPoint, ProjectedDot};
use tracing::debug;

/// Builds an origin-centred grid for a density tier
pub fn build_grid(tier: &DensityTier) -> Vec<GridPoint> {
    let half_width = (tier.cols.saturating_sub(1)) as f64 * tier.separation / 2.0;
    let half_depth = (tier.rows.saturating_sub(1)) as f64 * tier.separation / 2.0;

    let mut points = Vec::with_capacity(tier.rows * tier.cols);
    for ix in 0..tier.cols {
        for iy in 0..tier.rows {
            points.push(GridPoint {
                ix,
                iy,
                cx: ix as f64 * tier.separation - half_width,
                cz: iy as f64 * tier.separation - half_depth,
            });
        }
    }
    points
}

pub struct WaveField {
    config: WaveConfig,
    points: Vec<GridPoint>,
    tier: Option<DensityTier>,
    width: f64,
    height: f64,
    base_y: f64,
    state: RenderState,
}

impl WaveField {
    pub fn new(config: WaveConfig) -> Self {
        WaveField {
            config,
            points: Vec::new(),
            tier: None,
            width: 0.0,
            height: 0.0,
            base_y: 0.0,
            state: RenderState::default(),
        }
    }

    /// Rebuilds the grid for a new viewport.
    ///
    /// An empty or negative viewport leaves the field without points.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;

        if !(width > 0.0 && height > 0.0) {
            self.points.clear();
            self.tier = None;
            debug!(width, height, "wave field has no visible area");
            return;
        }

        let tier = if width < self.config.breakpoint {
            self.config.coarse
        } else {
            self.config.fine
        };
        self.base_y = height / 2.0 + self.config.base_offset;
        self.points = build_grid(&tier);
        self.tier = Some(tier);
        debug!(
            width,
            height,
            rows = tier.rows,
            cols = tier.cols,
            "wave field rebuilt"
        );
    }

    /// Advances the phase and eases the camera towards the pointer
    pub fn tick(&mut self, input: &FrameInput) {
        self.state.pointer = input.pointer;
        self.state.phase += self.config.wave_speed;
        let target = input.pointer[0] * self.config.max_yaw;
        self.state.yaw = approach(self.state.yaw, target, self.config.smoothing);
    }

    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn tier(&self) -> Option<DensityTier> {
        self.tier
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Projects a single point for the current state, `None` if it is culled
    pub fn project(&self, point: &GridPoint) -> Option<ProjectedDot> {
        let c = &self.config;
        let y = wave_height(
            point.ix as f64,
            point.iy as f64,
            self.state.phase,
            c.wave_height,
            c.secondary_height,
        );
        let [rx, _, rz] = multiply_matrix_vector(&rotation_y(self.state.yaw), &[point.cx, y, point.cz]);

        let scale = perspective_scale(c.fov, c.camera_distance, rz)?;
        let alpha = scale - 0.2;
        if alpha <= 0.0 {
            return None;
        }

        Some(ProjectedDot {
            screen_position: [
                rx * scale + self.width / 2.0,
                y * scale + self.base_y - self.state.pointer[1] * c.tilt,
            ],
            depth: rz,
            scale,
            alpha: alpha.min(1.0),
            radius: c.base_radius * scale,
        })
    }

    /// All dots visible this frame
    pub fn visible_dots(&self) -> Vec<ProjectedDot> {
        self.points.iter().filter_map(|p| self.project(p)).collect()
    }

    pub fn paint(&self, canvas: &mut Canvas) {
        for dot in self.visible_dots() {
            canvas.fill_circle(dot.screen_position, dot.radius, self.config.color, dot.alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::Rgb;

    fn field(width: f64, height: f64) -> WaveField {
        let mut field = WaveField::new(WaveConfig::default());
        field.resize(width, height);
        field
    }

    fn assert_centred(points: &[GridPoint]) {
        let n = points.len() as f64;
        let mean_x: f64 = points.iter().map(|p| p.cx).sum::<f64>() / n;
        let mean_z: f64 = points.iter().map(|p| p.cz).sum::<f64>() / n;
        assert!(mean_x.abs() < 1e-9, "mean cx = {mean_x}");
        assert!(mean_z.abs() < 1e-9, "mean cz = {mean_z}");
    }

    #[test]
    fn narrow_viewport_uses_coarse_tier() {
        let field = field(600.0, 800.0);
        assert_eq!(field.points().len(), 30 * 20);
        assert_eq!(field.tier().map(|t| t.cols), Some(20));
        assert_centred(field.points());
    }

    #[test]
    fn wide_viewport_uses_fine_tier() {
        let field = field(1280.0, 720.0);
        assert_eq!(field.points().len(), 60 * 60);
        assert_centred(field.points());
    }

    #[test]
    fn resize_replaces_the_grid() {
        let mut field = field(1280.0, 720.0);
        field.resize(500.0, 720.0);
        assert_eq!(field.points().len(), 600);
        field.resize(1920.0, 1080.0);
        assert_eq!(field.points().len(), 3600);
    }

    #[test]
    fn empty_viewport_has_no_points() {
        let mut field = field(0.0, 720.0);
        assert!(field.points().is_empty());
        field.resize(-10.0, -10.0);
        field.tick(&FrameInput::default());
        assert!(field.visible_dots().is_empty());

        let mut canvas = Canvas::new(4, 4, 1.0, Rgb::default());
        field.paint(&mut canvas);
        assert_eq!(canvas.draw_calls(), 0);
    }

    #[test]
    fn yaw_converges_to_pointer_target() {
        let mut field = field(1280.0, 720.0);
        let input = FrameInput {
            pointer: [1.0, 0.0],
            scroll_y: 0.0,
        };
        let mut previous_error = 0.5;
        for _ in 0..400 {
            field.tick(&input);
            let error = (0.5 - field.state().yaw).abs();
            assert!(error <= previous_error);
            assert!(field.state().yaw <= 0.5);
            previous_error = error;
        }
        assert!(previous_error < 1e-6);
    }

    #[test]
    fn phase_only_grows() {
        let mut field = field(1280.0, 720.0);
        let mut last = field.state().phase;
        for _ in 0..10 {
            field.tick(&FrameInput::default());
            assert!(field.state().phase > last);
            last = field.state().phase;
        }
    }

    #[test]
    fn drawn_dots_have_valid_alpha() {
        let mut field = field(1280.0, 720.0);
        let input = FrameInput {
            pointer: [-1.0, 0.7],
            scroll_y: 0.0,
        };
        for _ in 0..120 {
            field.tick(&input);
        }
        let dots = field.visible_dots();
        assert!(!dots.is_empty());
        assert!(dots.len() < field.points().len());
        for dot in &dots {
            assert!(dot.alpha > 0.0 && dot.alpha <= 1.0);
            assert!(dot.scale > 0.0);
            assert!((dot.radius - 2.5 * dot.scale).abs() < 1e-9);
        }
    }

    #[test]
    fn sweeping_camera_keeps_paint_bounded() {
        // 240 columns x 58 rows of terminal: fine tier in logical units
        let mut canvas = Canvas::new(240, 116, 4.0, Rgb::default());
        let (w, h) = canvas.logical_size();
        let mut field = field(w, h);
        assert_eq!(field.tier().map(|t| t.cols), Some(60));

        let area = 240 * 116;
        for frame in 0..300 {
            let pointer = if frame < 150 { 1.0 } else { -1.0 };
            field.tick(&FrameInput {
                pointer: [pointer, 0.0],
                scroll_y: 0.0,
            });
            canvas.clear();
            field.paint(&mut canvas);
            assert!(canvas.draw_calls() <= field.points().len());
            assert!(
                canvas.pixels_visited() <= canvas.draw_calls() * area,
                "frame {frame} visited {} pixels",
                canvas.pixels_visited()
            );
        }
    }

    #[test]
    fn nearer_dots_are_larger() {
        let field = field(1280.0, 720.0);
        let mut dots = field.visible_dots();
        dots.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        for pair in dots.windows(2) {
            assert!(pair[0].radius >= pair[1].radius);
        }
    }

    #[test]
    fn far_points_are_culled() {
        let field = field(1280.0, 720.0);
        // Without yaw the back row sits at cz = 1180, scale ~0.2 -> alpha <= 0
        let back_row: Vec<_> = field.points().iter().filter(|p| p.iy == 59).collect();
        assert!(back_row.iter().all(|p| field.project(p).is_none()));
    }

    #[test]
    fn paints_into_canvas() {
        let mut field = WaveField::new(WaveConfig::default());
        let mut canvas = Canvas::new(320, 180, 4.0, Rgb::default());
        let (w, h) = canvas.logical_size();
        field.resize(w, h);
        field.tick(&FrameInput::default());
        field.paint(&mut canvas);
        assert_eq!(canvas.draw_calls(), field.visible_dots().len());
    }
}
