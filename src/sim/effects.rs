//! Burst particle emitters (explosions)
//!
//! Purely visual: particles never touch the physics world.

use glam::Vec2;
use rand::Rng;

use crate::assets::EmitterDef;

/// A single particle, positioned relative to its emitter
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub offset: Vec2,
    pub vel: Vec2,
    /// 1 at birth, 0 when gone
    pub life: f32,
    pub size: f32,
}

/// A burst emitted all at once
#[derive(Debug, Clone)]
pub struct Emitter {
    pub color: [f32; 4],
    /// Seconds per particle
    pub lifetime: f32,
    pub particles: Vec<Particle>,
}

impl Emitter {
    /// Emit up to `max_particles` particles in random directions
    pub fn burst(def: &EmitterDef, rng: &mut impl Rng, max_particles: usize) -> Self {
        let count = (def.particle_count as usize).min(max_particles);
        let particles = (0..count)
            .map(|_| {
                let angle = rng.random_range(0.0..std::f32::consts::TAU);
                let jitter = if def.speed_range > 0.0 {
                    rng.random_range(-def.speed_range..=def.speed_range)
                } else {
                    0.0
                };
                let speed = (def.speed + jitter).max(0.0);
                Particle {
                    offset: Vec2::ZERO,
                    vel: Vec2::from_angle(angle) * speed,
                    life: 1.0,
                    size: def.size,
                }
            })
            .collect();

        Self {
            color: def.color,
            lifetime: def.lifetime.max(f32::EPSILON),
            particles,
        }
    }

    /// Move and fade particles, dropping the dead ones
    pub fn advance(&mut self, dt: f32) {
        let fade = dt / self.lifetime;
        for particle in &mut self.particles {
            particle.offset += particle.vel * dt;
            particle.vel *= 0.96;
            particle.life -= fade;
        }
        self.particles.retain(|p| p.life > 0.0);
    }
}
