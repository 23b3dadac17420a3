/// One point of the wave field, fixed at grid build time
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPoint {
    pub ix: usize,
    pub iy: usize,
    /// World position on the floor plane, centred on the origin
    pub cx: f64,
    pub cz: f64,
}

/// A grid point after rotation and projection, ready to be drawn
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedDot {
    pub screen_position: [f64; 2],
    /// Depth after rotation
    pub depth: f64,
    pub scale: f64,
    pub alpha: f64,
    pub radius: f64,
}
