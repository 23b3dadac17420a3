//! The animated background behind every view, one of three effects

use crate::config::AppConfig;
use crate::graphics::Canvas;
use crate::horizon::HorizonGrid;
use crate::stars::Constellation;
use crate::state::FrameInput;
use crate::wave::WaveField;
use clap::ValueEnum;
use rand::rngs::StdRng;
use serde::Deserialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackdropKind {
    /// 3D sine-wave particle field
    Wave,
    /// Wireframe floor grid
    Grid,
    /// Drifting linked particles
    Stars,
}

impl BackdropKind {
    pub fn next(self) -> Self {
        match self {
            BackdropKind::Wave => BackdropKind::Grid,
            BackdropKind::Grid => BackdropKind::Stars,
            BackdropKind::Stars => BackdropKind::Wave,
        }
    }
}

impl fmt::Display for BackdropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackdropKind::Wave => write!(f, "wave"),
            BackdropKind::Grid => write!(f, "grid"),
            BackdropKind::Stars => write!(f, "stars"),
        }
    }
}

pub enum Backdrop {
    Wave(WaveField),
    Grid(HorizonGrid),
    Stars(Constellation<StdRng>),
}

impl Backdrop {
    pub fn new(kind: BackdropKind, config: &AppConfig, rng: StdRng) -> Self {
        match kind {
            BackdropKind::Wave => Backdrop::Wave(WaveField::new(config.wave.clone())),
            BackdropKind::Grid => Backdrop::Grid(HorizonGrid::new(config.horizon.clone())),
            BackdropKind::Stars => Backdrop::Stars(Constellation::new(config.stars.clone(), rng)),
        }
    }

    pub fn kind(&self) -> BackdropKind {
        match self {
            Backdrop::Wave(_) => BackdropKind::Wave,
            Backdrop::Grid(_) => BackdropKind::Grid,
            Backdrop::Stars(_) => BackdropKind::Stars,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        match self {
            Backdrop::Wave(field) => field.resize(width, height),
            Backdrop::Grid(grid) => grid.resize(width, height),
            Backdrop::Stars(stars) => stars.resize(width, height),
        }
    }

    pub fn tick(&mut self, input: &FrameInput) {
        match self {
            Backdrop::Wave(field) => field.tick(input),
            Backdrop::Grid(grid) => grid.tick(),
            Backdrop::Stars(stars) => stars.tick(),
        }
    }

    pub fn paint(&self, canvas: &mut Canvas, input: &FrameInput) {
        match self {
            Backdrop::Wave(field) => field.paint(canvas),
            Backdrop::Grid(grid) => grid.paint(canvas, input.scroll_y),
            Backdrop::Stars(stars) => stars.paint(canvas),
        }
    }
}
