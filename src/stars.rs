//! Drifting constellation: slow particles joined by faint lines when close

use crate::config::StarsConfig;
use crate::graphics::Canvas;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    pub alpha: f64,
}

impl Particle {
    pub fn random<R: Rng>(rng: &mut R, width: f64, height: f64, config: &StarsConfig) -> Self {
        let mut unit = || rng.gen::<f64>();
        Particle {
            x: unit() * width,
            y: unit() * height,
            vx: (unit() - 0.5) * 2.0 * config.max_speed,
            vy: (unit() - 0.5) * 2.0 * config.max_speed,
            radius: unit() * config.max_radius,
            alpha: unit() * config.max_alpha,
        }
    }

    /// Next position; a velocity component flips once its coordinate has left the
    /// bounds while still heading away from them
    pub fn step(self, width: f64, height: f64) -> Particle {
        let x = self.x + self.vx;
        let y = self.y + self.vy;
        let vx = if (x < 0.0 && self.vx < 0.0) || (x > width && self.vx > 0.0) {
            -self.vx
        } else {
            self.vx
        };
        let vy = if (y < 0.0 && self.vy < 0.0) || (y > height && self.vy > 0.0) {
            -self.vy
        } else {
            self.vy
        };
        Particle { x, y, vx, vy, ..self }
    }
}

pub struct Constellation<R> {
    config: StarsConfig,
    rng: R,
    particles: Vec<Particle>,
    width: f64,
    height: f64,
}

impl<R: Rng> Constellation<R> {
    pub fn new(config: StarsConfig, rng: R) -> Self {
        Constellation {
            config,
            rng,
            particles: Vec::new(),
            width: 0.0,
            height: 0.0,
        }
    }

    /// Updates the bounds; the particles are seeded on the first usable size and
    /// pulled inside the new bounds afterwards
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        for p in self.particles.iter_mut() {
            p.x = p.x.clamp(0.0, self.width);
            p.y = p.y.clamp(0.0, self.height);
        }
        if self.particles.is_empty() && self.width > 0.0 && self.height > 0.0 {
            let (w, h) = (self.width, self.height);
            let config = &self.config;
            let rng = &mut self.rng;
            self.particles = (0..config.count)
                .map(|_| Particle::random(rng, w, h, config))
                .collect();
        }
    }

    pub fn tick(&mut self) {
        let (w, h) = (self.width, self.height);
        for particle in self.particles.iter_mut() {
            *particle = particle.step(w, h);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Index pairs of particles close enough to be linked
    pub fn links(&self) -> Vec<(usize, usize)> {
        let max = self.config.link_distance;
        let mut links = Vec::new();
        for i in 0..self.particles.len() {
            for j in i + 1..self.particles.len() {
                let a = &self.particles[i];
                let b = &self.particles[j];
                let (dx, dy) = (a.x - b.x, a.y - b.y);
                if (dx * dx + dy * dy).sqrt() < max {
                    links.push((i, j));
                }
            }
        }
        links
    }

    pub fn paint(&self, canvas: &mut Canvas) {
        let color = self.config.color;
        for p in &self.particles {
            canvas.fill_circle([p.x, p.y], p.radius, color, p.alpha);
        }
        for (i, j) in self.links() {
            let (a, b) = (&self.particles[i], &self.particles[j]);
            canvas.draw_line([a.x, a.y], [b.x, b.y], color, self.config.link_alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn constellation() -> Constellation<StdRng> {
        let mut stars = Constellation::new(StarsConfig::default(), StdRng::seed_from_u64(7));
        stars.resize(400.0, 300.0);
        stars
    }

    #[test]
    fn seeds_configured_count() {
        let stars = constellation();
        assert_eq!(stars.particles().len(), 100);
        for p in stars.particles() {
            assert!(p.vx.abs() <= 0.25 && p.vy.abs() <= 0.25);
            assert!(p.radius >= 0.0 && p.radius < 2.0);
        }
    }

    #[test]
    fn step_is_pure_and_reflects() {
        let p = Particle {
            x: 9.9,
            y: 5.0,
            vx: 0.5,
            vy: -0.1,
            radius: 1.0,
            alpha: 0.3,
        };
        let next = p.step(10.0, 10.0);
        assert_eq!(p.x, 9.9);
        assert!((next.x - 10.4).abs() < 1e-9);
        assert_eq!(next.vx, -0.5);
        assert_eq!(next.vy, -0.1);
        assert_eq!(next.radius, p.radius);
    }

    #[test]
    fn particles_stay_near_bounds() {
        let mut stars = constellation();
        for _ in 0..5000 {
            stars.tick();
        }
        for p in stars.particles() {
            assert!(p.x > -0.5 && p.x < 400.5);
            assert!(p.y > -0.5 && p.y < 300.5);
        }
    }

    #[test]
    fn resize_keeps_particles() {
        let mut stars = constellation();
        let before = stars.particles().to_vec();
        stars.resize(800.0, 600.0);
        assert_eq!(stars.particles(), before.as_slice());
    }

    #[test]
    fn outside_particle_heads_back_in() {
        let mut p = Particle {
            x: 700.0,
            y: 50.0,
            vx: 0.2,
            vy: 0.0,
            radius: 1.0,
            alpha: 0.3,
        };
        for _ in 0..10_000 {
            p = p.step(400.0, 300.0);
        }
        assert!(p.x > -0.5 && p.x < 400.5, "stuck at x={}", p.x);

        // Moving inward from outside must not flip
        let inbound = Particle { x: -5.0, vx: 0.1, ..p };
        assert_eq!(inbound.step(400.0, 300.0).vx, 0.1);
    }

    #[test]
    fn shrinking_keeps_particles_bounded() {
        let mut stars = constellation();
        stars.resize(800.0, 600.0);
        for _ in 0..2000 {
            stars.tick();
        }
        stars.resize(200.0, 150.0);
        for p in stars.particles() {
            assert!((0.0..=200.0).contains(&p.x) && (0.0..=150.0).contains(&p.y));
        }
        for _ in 0..20_000 {
            stars.tick();
        }
        for p in stars.particles() {
            assert!(p.x > -0.5 && p.x < 200.5, "x={}", p.x);
            assert!(p.y > -0.5 && p.y < 150.5, "y={}", p.y);
        }
    }

    #[test]
    fn links_respect_distance() {
        let stars = constellation();
        for (i, j) in stars.links() {
            let (a, b) = (stars.particles()[i], stars.particles()[j]);
            assert!(((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt() < 100.0);
        }
    }
}
