//! Retro wireframe floor running towards a horizon

use crate::config::HorizonConfig;
use crate::graphics::Canvas;
use crate::math::{floor_line_y, pulse};
use tracing::debug;

/// A horizontal floor line for the current frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloorLine {
    pub y: f64,
    pub alpha: f64,
}

pub struct HorizonGrid {
    config: HorizonConfig,
    width: f64,
    height: f64,
    horizon_y: f64,
    offset: f64,
    time: f64,
}

impl HorizonGrid {
    pub fn new(config: HorizonConfig) -> Self {
        HorizonGrid {
            config,
            width: 0.0,
            height: 0.0,
            horizon_y: 0.0,
            offset: 0.0,
            time: 0.0,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.horizon_y = self.height * self.config.horizon_ratio;
        debug!(width, height, horizon_y = self.horizon_y, "horizon grid resized");
    }

    /// Moves the floor forward; the offset wraps at one cell so the loop is seamless
    pub fn tick(&mut self) {
        self.offset = (self.offset + self.config.speed).rem_euclid(self.config.cell_size);
        self.time += self.config.time_step;
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn horizon_y(&self) -> f64 {
        self.horizon_y
    }

    /// Floor lines between the horizon and the bottom edge, nearest first
    pub fn floor_lines(&self) -> Vec<FloorLine> {
        if self.height <= 0.0 || self.width <= 0.0 {
            return Vec::new();
        }
        let bands = self.config.bands as f64;
        let breathing = 0.6 + 0.4 * pulse(self.time);

        (0..self.config.bands)
            .filter_map(|band| {
                let p = (band as f64 + self.offset / self.config.cell_size) / bands;
                let y = floor_line_y(p, self.height, self.horizon_y);
                if y < self.horizon_y || y > self.height {
                    return None;
                }
                let depth_alpha = self.config.base_alpha * (1.0 - p);
                Some(FloorLine {
                    y,
                    alpha: (depth_alpha * breathing).clamp(0.0, 1.0),
                })
            })
            .collect()
    }

    /// Draws the floor shifted by `scroll_y * parallax`
    pub fn paint(&self, canvas: &mut Canvas, scroll_y: f64) {
        if self.height <= 0.0 || self.width <= 0.0 {
            return;
        }
        let color = self.config.color;

        canvas.save();
        canvas.translate(0.0, -scroll_y * self.config.parallax);

        canvas.draw_line(
            [0.0, self.horizon_y],
            [self.width, self.horizon_y],
            color,
            self.config.base_alpha,
        );
        for line in self.floor_lines() {
            canvas.draw_line([0.0, line.y], [self.width, line.y], color, line.alpha);
        }

        let vanishing_x = self.width / 2.0;
        let lanes = self.config.lanes;
        if lanes > 0 {
            let spread = self.width * 3.0 / lanes as f64;
            for lane in 0..=lanes {
                let bottom_x = vanishing_x + (lane as f64 - lanes as f64 / 2.0) * spread;
                canvas.draw_line(
                    [vanishing_x, self.horizon_y],
                    [bottom_x, self.height],
                    color,
                    self.config.base_alpha * 0.5,
                );
            }
        }

        canvas.restore();
    }
}
