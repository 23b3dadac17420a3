/// Input the shell feeds into the backdrops every frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Pointer position normalised to -1..1 on each axis
    pub pointer: [f64; 2],
    /// Raw vertical page scroll offset in logical units
    pub scroll_y: f64,
}

impl FrameInput {
    /// Maps a cell position inside a `cols` x `rows` area to -1..1
    pub fn normalise_pointer(column: u16, row: u16, cols: u16, rows: u16) -> [f64; 2] {
        let norm = |v: u16, extent: u16| {
            if extent == 0 {
                0.0
            } else {
                ((v as f64 + 0.5) / extent as f64 * 2.0 - 1.0).clamp(-1.0, 1.0)
            }
        };
        [norm(column, cols), norm(row, rows)]
    }
}

/// Per-frame state of the wave renderer
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderState {
    /// Elapsed wave phase, only ever grows
    pub phase: f64,
    /// Smoothed camera yaw in radians
    pub yaw: f64,
    /// Pointer position seen on the last frame
    pub pointer: [f64; 2],
}
