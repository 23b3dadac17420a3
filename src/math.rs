/// Multiplies a 3x3 matrix by a 3-dimensional vector
pub fn multiply_matrix_vector(matrix: &[[f64; 3]; 3], vector: &[f64; 3]) -> [f64; 3] {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Rotation about the vertical axis.
///
/// Maps `(x, z)` to `(x cos a - z sin a, z cos a + x sin a)`.
pub fn rotation_y(angle: f64) -> [[f64; 3]; 3] {
    let (sin_a, cos_a) = angle.sin_cos();
    [[cos_a, 0.0, -sin_a], [0.0, 1.0, 0.0], [sin_a, 0.0, cos_a]]
}

/// Perspective factor for a point at depth `z`.
///
/// Returns `None` when the point sits on or behind the camera plane, where the
/// projection is undefined.
pub fn perspective_scale(fov: f64, camera_distance: f64, z: f64) -> Option<f64> {
    let denominator = fov + camera_distance + z;
    if denominator > 0.0 {
        Some(fov / denominator)
    } else {
        None
    }
}

/// One step of exponential smoothing of `current` towards `target`
pub fn approach(current: f64, target: f64, factor: f64) -> f64 {
    current + (target - current) * factor
}

/// Height of the wave surface at grid index `(ix, iy)`: a radial ripple plus a
/// lateral travelling wave.
pub fn wave_height(ix: f64, iy: f64, phase: f64, amplitude: f64, secondary: f64) -> f64 {
    let distance = (ix * ix + iy * iy).sqrt();
    (distance * 0.2 + phase).sin() * amplitude + (ix * 0.3 + phase).sin() * secondary
}

/// Screen row of a floor line at normalised depth `p`.
///
/// `p = 0` is the bottom edge and `p = 1` the horizon; the quadratic easing is
/// what gives the floor its foreshortening.
pub fn floor_line_y(p: f64, height: f64, horizon_y: f64) -> f64 {
    height - p * p * (height - horizon_y)
}

/// Slow breathing pulse in [0, 1]
pub fn pulse(t: f64) -> f64 {
    ((t * 0.5).sin() + 1.0) / 2.0
}
