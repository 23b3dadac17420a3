use crossterm::style::Color;
use serde::Deserialize;

/// 24-bit colour used by the canvas and the themes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Linear blend towards `other`; `t` is clamped to [0, 1]
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    pub fn to_color(self) -> Color {
        Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value).ok_or_else(|| format!("invalid colour '{value}', expected #rrggbb"))
    }
}

/// Off-screen RGB surface the backdrops draw into.
///
/// Drawing calls take logical coordinates; `units_per_pixel` maps them onto the
/// physical pixel grid so the effects keep the proportions they were tuned for
/// even on a coarse terminal canvas. A translation stack (`save`/`translate`/
/// `restore`) scopes offsets such as scroll parallax to the draws that want them.
pub struct Canvas {
    width: usize,
    height: usize,
    units_per_pixel: f64,
    background: Rgb,
    pixels: Vec<Rgb>,
    translation: [f64; 2],
    saved: Vec<[f64; 2]>,
    draw_calls: usize,
    pixels_visited: usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize, units_per_pixel: f64, background: Rgb) -> Self {
        Canvas {
            width,
            height,
            units_per_pixel: units_per_pixel.max(f64::EPSILON),
            background,
            pixels: vec![background; width * height],
            translation: [0.0, 0.0],
            saved: Vec::new(),
            draw_calls: 0,
            pixels_visited: 0,
        }
    }

    /// Reallocates the pixel buffer for a new physical size
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![self.background; width * height];
        self.translation = [0.0, 0.0];
        self.saved.clear();
    }

    /// Physical size in pixels
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Size in logical units, the space backdrops compute in
    pub fn logical_size(&self) -> (f64, f64) {
        (
            self.width as f64 * self.units_per_pixel,
            self.height as f64 * self.units_per_pixel,
        )
    }

    pub fn units_per_pixel(&self) -> f64 {
        self.units_per_pixel
    }

    /// Resets every pixel to the background and drops any leftover transform
    pub fn clear(&mut self) {
        self.pixels.fill(self.background);
        self.translation = [0.0, 0.0];
        self.saved.clear();
        self.draw_calls = 0;
        self.pixels_visited = 0;
    }

    pub fn save(&mut self) {
        self.saved.push(self.translation);
    }

    pub fn restore(&mut self) {
        if let Some(translation) = self.saved.pop() {
            self.translation = translation;
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.translation[0] += dx;
        self.translation[1] += dy;
    }

    pub fn translation(&self) -> [f64; 2] {
        self.translation
    }

    /// Number of shapes submitted since the last `clear`
    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    /// Pixel positions examined by the rasterizers since the last `clear`
    pub fn pixels_visited(&self) -> usize {
        self.pixels_visited
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x + self.translation[0]) / self.units_per_pixel,
            (y + self.translation[1]) / self.units_per_pixel,
        )
    }

    fn blend(&mut self, x: isize, y: isize, color: Rgb, alpha: f64) {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return;
        }
        let offset = y as usize * self.width + x as usize;
        self.pixels[offset] = self.pixels[offset].lerp(color, alpha);
    }

    /// Fills a dot; `radius` is in logical units
    pub fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Rgb, alpha: f64) {
        if alpha <= 0.0 || radius <= 0.0 {
            return;
        }
        self.draw_calls += 1;
        let (cx, cy) = self.to_pixel(center[0], center[1]);
        let r = radius / self.units_per_pixel;

        // Sub-pixel dots still land on one pixel, dimmed by their coverage
        if r < 0.5 {
            let coverage = (r * 2.0).clamp(0.25, 1.0);
            self.blend(cx.floor() as isize, cy.floor() as isize, color, alpha * coverage);
            return;
        }

        // Only the part of the bounding box that lies on the canvas is walked
        let min_x = ((cx - r).floor() as isize).max(0);
        let max_x = ((cx + r).ceil() as isize).min(self.width as isize - 1);
        let min_y = ((cy - r).floor() as isize).max(0);
        let max_y = ((cy + r).ceil() as isize).min(self.height as isize - 1);
        if min_x > max_x || min_y > max_y {
            return;
        }
        self.pixels_visited += ((max_x - min_x + 1) * (max_y - min_y + 1)) as usize;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r * r {
                    self.blend(x, y, color, alpha);
                }
            }
        }
    }

    /// Draws a line between two logical points using Bresenham's algorithm
    pub fn draw_line(&mut self, from: [f64; 2], to: [f64; 2], color: Rgb, alpha: f64) {
        if alpha <= 0.0 {
            return;
        }
        self.draw_calls += 1;
        let (x0, y0) = self.to_pixel(from[0], from[1]);
        let (x1, y1) = self.to_pixel(to[0], to[1]);
        let (w, h) = (self.width as f64, self.height as f64);
        // Both ends past the same edge: nothing of the line is on the canvas
        if (x0 < 0.0 && x1 < 0.0)
            || (y0 < 0.0 && y1 < 0.0)
            || (x0 >= w && x1 >= w)
            || (y0 >= h && y1 >= h)
        {
            return;
        }
        let (mut x0, mut y0, x1, y1) = (
            x0.round() as isize,
            y0.round() as isize,
            x1.round() as isize,
            y1.round() as isize,
        );
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy; // error value e_xy

        loop {
            self.pixels_visited += 1;
            self.blend(x0, y0, color, alpha);

            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}
