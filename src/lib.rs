//! neonscan: a neon console front end with an animated 3D backdrop, view
//! navigation and a scripted payload scanner feeding a session log.

pub mod analysis;
pub mod backdrop;
pub mod config;
pub mod error;
pub mod feed;
pub mod graphics;
pub mod horizon;
pub mod math;
pub mod nav;
pub mod scheduler;
pub mod sequence;
pub mod stars;
pub mod state;
pub mod terminal;
pub mod vertex;
pub mod wave;
pub mod widget;

pub use backdrop::{Backdrop, BackdropKind};
pub use config::{load_config, AppConfig};
pub use error::{NeonError, Result};
pub use feed::{LogEntry, LogFeed};
pub use nav::Navigator;
pub use sequence::{ScanController, ScanEvent, ScanPhase};
pub use widget::NeonWidget;
