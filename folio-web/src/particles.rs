//! CPU particle network for the page background
//!
//! A fixed set of particles drifts inside a viewport-scaled box, is pushed
//! away from the pointer, and is linked to nearby particles every frame.
//! All render buffers are allocated once at construction and rewritten in
//! place, so a frame never allocates.

use glam::{Vec2, Vec3};
use rand::Rng;

/// Color constants (RGB, normalized 0.0-1.0)
pub mod colors {
    /// Cyan-blue particles (#2D4D66)
    pub const CYAN_BLUE: [f32; 3] = [0.176, 0.302, 0.400];

    /// Blue particles (#334466)
    pub const BLUE: [f32; 3] = [0.200, 0.267, 0.400];

    /// Purple-blue particles (#3D3D5D)
    pub const PURPLE_BLUE: [f32; 3] = [0.239, 0.239, 0.365];

    /// Connection lines (#445566)
    pub const LINE: [f32; 3] = [0.267, 0.333, 0.400];

    /// Peak line alpha, reached when two particles coincide
    pub const LINE_MAX_ALPHA: f32 = 0.4;
}

/// Visible world extent of the scene at z = 0
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Create a viewport; negative or NaN extents collapse to zero
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }
}

/// Configuration for the particle field
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Number of particles, fixed for the field's lifetime
    pub particle_count: usize,
    /// Maximum distance at which two particles are linked
    pub connection_distance: f32,
    /// Maximum links accepted per originating particle
    pub max_connections: usize,
    /// Pointer influence radius
    pub mouse_influence: f32,
    /// Step applied to particles inside the influence radius
    pub push_strength: f32,
    /// Amplitude of the per-frame oscillating drift
    pub drift: f32,
    /// Initial spread as a multiple of the viewport size
    pub spread: f32,
    /// Initial depth range along z
    pub depth: f32,
    /// Clamp box as a fraction of the viewport size (each side)
    pub bound_fraction: f32,
    /// Full width of the random initial velocity range per axis
    pub velocity_range: Vec3,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 250,
            connection_distance: 3.5,
            max_connections: 5,
            mouse_influence: 1.8,
            push_strength: 0.02,
            drift: 0.001,
            spread: 1.2,
            depth: 6.0,
            bound_fraction: 0.6,
            velocity_range: Vec3::new(0.01, 0.01, 0.005),
        }
    }
}

/// A single particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    /// Initial random velocity; retained but not integrated
    pub velocity: Vec3,
    /// Spawn position; retained for future restoring behavior
    pub original_position: Vec3,
}

impl Particle {
    /// Create a particle at rest at the given position
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            original_position: position,
        }
    }
}

/// A rendered link between two particles (`a < b`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionEdge {
    pub a: usize,
    pub b: usize,
    pub opacity: f32,
}

/// Borrowed view of the geometry produced by the latest frame
#[derive(Debug, Clone, Copy)]
pub struct FrameGeometry<'a> {
    /// xyz per particle
    pub positions: &'a [f32],
    /// rgb per particle
    pub colors: &'a [f32],
    /// Links accepted this frame, in encounter order
    pub edges: &'a [ConnectionEdge],
    /// Two xyz vertices per edge
    pub line_positions: &'a [f32],
    /// Two rgba vertices per edge
    pub line_colors: &'a [f32],
}

/// Upper bound on the number of edges a frame can produce
pub fn max_edges(particle_count: usize, max_connections: usize) -> usize {
    let all_pairs = particle_count * particle_count.saturating_sub(1) / 2;
    (particle_count * max_connections).min(all_pairs)
}

/// The particle network
pub struct ParticleField {
    particles: Vec<Particle>,
    config: FieldConfig,
    viewport: Viewport,
    positions: Vec<f32>,
    colors: Vec<f32>,
    edges: Vec<ConnectionEdge>,
    line_positions: Vec<f32>,
    line_colors: Vec<f32>,
}

impl ParticleField {
    /// Create a field with randomly placed particles
    pub fn new<R: Rng + ?Sized>(config: FieldConfig, viewport: Viewport, rng: &mut R) -> Self {
        let spread_x = viewport.width * config.spread;
        let spread_y = viewport.height * config.spread;

        let mut particles = Vec::with_capacity(config.particle_count);
        let mut palette = Vec::with_capacity(config.particle_count * 3);

        for _ in 0..config.particle_count {
            let position = Vec3::new(
                centered(rng) * spread_x,
                centered(rng) * spread_y,
                centered(rng) * config.depth,
            );
            let velocity = Vec3::new(
                centered(rng) * config.velocity_range.x,
                centered(rng) * config.velocity_range.y,
                centered(rng) * config.velocity_range.z,
            );
            particles.push(Particle {
                position,
                velocity,
                original_position: position,
            });

            let roll: f32 = rng.gen_range(0.0..1.0);
            let color = if roll < 0.3 {
                colors::CYAN_BLUE
            } else if roll < 0.6 {
                colors::BLUE
            } else {
                colors::PURPLE_BLUE
            };
            palette.extend_from_slice(&color);
        }

        Self::assemble(particles, palette, config, viewport)
    }

    /// Create a field from explicit particles, all drawn in the default color
    pub fn from_particles(
        particles: Vec<Particle>,
        config: FieldConfig,
        viewport: Viewport,
    ) -> Self {
        let palette = particles
            .iter()
            .flat_map(|_| colors::BLUE)
            .collect::<Vec<f32>>();
        let config = FieldConfig {
            particle_count: particles.len(),
            ..config
        };
        Self::assemble(particles, palette, config, viewport)
    }

    fn assemble(
        particles: Vec<Particle>,
        colors: Vec<f32>,
        config: FieldConfig,
        viewport: Viewport,
    ) -> Self {
        let edge_capacity = max_edges(particles.len(), config.max_connections);
        let positions = particles
            .iter()
            .flat_map(|p| p.position.to_array())
            .collect();

        let mut field = Self {
            particles,
            config,
            viewport,
            positions,
            colors,
            edges: Vec::with_capacity(edge_capacity),
            line_positions: Vec::with_capacity(edge_capacity * 6),
            line_colors: Vec::with_capacity(edge_capacity * 8),
        };
        field.rebuild_connections();
        field
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn edges(&self) -> &[ConnectionEdge] {
        &self.edges
    }

    /// Half-extent of the clamp box
    pub fn bounds(&self) -> Vec2 {
        Vec2::new(
            self.viewport.width * self.config.bound_fraction,
            self.viewport.height * self.config.bound_fraction,
        )
    }

    /// Geometry for the renderer
    pub fn geometry(&self) -> FrameGeometry<'_> {
        FrameGeometry {
            positions: &self.positions,
            colors: &self.colors,
            edges: &self.edges,
            line_positions: &self.line_positions,
            line_colors: &self.line_colors,
        }
    }

    /// Advance one frame
    ///
    /// `elapsed` is the scene clock in seconds and `pointer` the pointer
    /// position in world coordinates.
    pub fn update(&mut self, elapsed: f32, pointer: Vec2) {
        let bound = self.bounds();
        let influence = self.config.mouse_influence;

        for (i, particle) in self.particles.iter_mut().enumerate() {
            let phase = i as f32 * 0.1;
            particle.position.x += (elapsed * 0.3 + phase).sin() * self.config.drift;
            particle.position.y += (elapsed * 0.2 + phase).cos() * self.config.drift;

            let planar = particle.position.truncate();
            let distance = planar.distance(pointer);
            if distance < influence {
                let direction = (planar - pointer).normalize_or_zero();
                let force = (influence - distance) / influence;
                particle.position.x += direction.x * force * self.config.push_strength;
                particle.position.y += direction.y * force * self.config.push_strength;
            }

            // Snap to the box edge rather than reflecting
            particle.position.x = particle.position.x.clamp(-bound.x, bound.x);
            particle.position.y = particle.position.y.clamp(-bound.y, bound.y);

            let base = i * 3;
            self.positions[base..base + 3].copy_from_slice(&particle.position.to_array());
        }

        self.rebuild_connections();
    }

    /// Rebuild the link list in index order
    ///
    /// The first `max_connections` partners found within range are taken,
    /// not the nearest ones.
    fn rebuild_connections(&mut self) {
        self.edges.clear();
        self.line_positions.clear();
        self.line_colors.clear();

        let threshold = self.config.connection_distance;
        let n = self.particles.len();

        for i in 0..n {
            let mut connections = 0;
            let mut j = i + 1;
            while j < n && connections < self.config.max_connections {
                let a = self.particles[i].position;
                let b = self.particles[j].position;
                let distance = a.distance(b);

                if distance < threshold {
                    let opacity = (1.0 - distance / threshold) * colors::LINE_MAX_ALPHA;
                    self.edges.push(ConnectionEdge { a: i, b: j, opacity });

                    self.line_positions.extend_from_slice(&a.to_array());
                    self.line_positions.extend_from_slice(&b.to_array());
                    for _ in 0..2 {
                        self.line_colors.extend_from_slice(&colors::LINE);
                        self.line_colors.push(opacity);
                    }
                    connections += 1;
                }
                j += 1;
            }
        }
    }
}

/// Uniform sample in [-0.5, 0.5)
fn centered<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(0.0..1.0f32) - 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn seeded() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn far_pointer() -> Vec2 {
        Vec2::new(1000.0, 1000.0)
    }

    #[test]
    fn creates_configured_particle_count() {
        let viewport = Viewport::new(10.0, 8.0);
        let field = ParticleField::new(FieldConfig::default(), viewport, &mut seeded());

        assert_eq!(field.particles().len(), 250);
        assert_eq!(field.geometry().positions.len(), 750);
        assert_eq!(field.geometry().colors.len(), 750);
    }

    #[test]
    fn initial_positions_fall_inside_spread_volume() {
        let viewport = Viewport::new(10.0, 8.0);
        let field = ParticleField::new(FieldConfig::default(), viewport, &mut seeded());

        for p in field.particles() {
            assert!(p.position.x.abs() <= 6.0);
            assert!(p.position.y.abs() <= 4.8);
            assert!(p.position.z.abs() <= 3.0);
            assert!(p.velocity.x.abs() <= 0.005);
            assert!(p.velocity.z.abs() <= 0.0025);
            assert_eq!(p.position, p.original_position);
        }
    }

    #[test]
    fn zero_viewport_collapses_spread() {
        let mut field =
            ParticleField::new(FieldConfig::default(), Viewport::new(0.0, 0.0), &mut seeded());

        for p in field.particles() {
            assert_eq!(p.position.x, 0.0);
            assert_eq!(p.position.y, 0.0);
        }

        // Should not panic or produce NaN with every particle on the pointer
        field.update(1.0, Vec2::ZERO);
        for p in field.particles() {
            assert_eq!(p.position.x, 0.0);
            assert_eq!(p.position.y, 0.0);
            assert!(p.position.z.is_finite());
        }
    }

    #[test]
    fn particles_stay_inside_bounds() {
        let config = FieldConfig {
            particle_count: 60,
            ..Default::default()
        };
        let viewport = Viewport::new(4.0, 3.0);
        let mut field = ParticleField::new(config, viewport, &mut seeded());
        let bound = field.bounds();

        for frame in 0..600 {
            let t = frame as f32 / 60.0;
            // Sweep the pointer through the field
            let pointer = Vec2::new((t * 2.0).sin() * 2.0, (t * 3.0).cos() * 1.5);
            field.update(t, pointer);

            for p in field.particles() {
                assert!(p.position.x.abs() <= bound.x, "x out of bounds: {}", p.position.x);
                assert!(p.position.y.abs() <= bound.y, "y out of bounds: {}", p.position.y);
            }
        }
        assert_eq!(field.particles().len(), 60);
    }

    #[test]
    fn out_of_box_particle_snaps_to_edge() {
        let particles = vec![Particle::at(Vec3::new(50.0, -50.0, 0.0))];
        let viewport = Viewport::new(10.0, 10.0);
        let mut field = ParticleField::from_particles(particles, FieldConfig::default(), viewport);

        field.update(0.0, far_pointer());

        let p = field.particles()[0].position;
        assert_eq!(p.x, 6.0);
        assert_eq!(p.y, -6.0);
    }

    #[test]
    fn edges_per_particle_never_exceed_limit() {
        // A dense cluster so that every particle has many candidates
        let viewport = Viewport::new(2.0, 2.0);
        let mut field = ParticleField::new(FieldConfig::default(), viewport, &mut seeded());

        for frame in 0..5 {
            field.update(frame as f32 * 0.016, Vec2::ZERO);

            let mut per_origin = vec![0usize; field.particles().len()];
            for edge in field.edges() {
                assert!(edge.a < edge.b);
                per_origin[edge.a] += 1;
            }
            assert!(per_origin.iter().all(|&count| count <= 5));
        }
    }

    #[test]
    fn first_found_partners_win_over_nearer_ones() {
        // Particle 0 has six partners in range; the nearest comes last
        let particles = [0.0, 3.0, 2.5, 2.0, 1.5, 1.0, 0.5]
            .iter()
            .map(|&x| Particle::at(Vec3::new(x, 0.0, 0.0)))
            .collect();
        let viewport = Viewport::new(20.0, 20.0);
        let mut field = ParticleField::from_particles(particles, FieldConfig::default(), viewport);

        field.update(0.0, far_pointer());

        let partners: Vec<usize> = field
            .edges()
            .iter()
            .filter(|e| e.a == 0)
            .map(|e| e.b)
            .collect();
        assert_eq!(partners, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn opacity_fades_with_distance() {
        let particles = vec![
            Particle::at(Vec3::new(0.0, 0.0, 0.0)),
            Particle::at(Vec3::new(0.0, 0.0, 1.75)),
        ];
        let viewport = Viewport::new(10.0, 10.0);
        let field = ParticleField::from_particles(particles, FieldConfig::default(), viewport);

        let edge = field.edges()[0];
        assert!((edge.opacity - 0.2).abs() < 1e-5);

        let geometry = field.geometry();
        assert_eq!(geometry.line_positions.len(), 6);
        assert_eq!(geometry.line_colors.len(), 8);
        assert!((geometry.line_colors[3] - 0.2).abs() < 1e-5);
    }

    #[test]
    fn distant_particles_are_not_linked() {
        let particles = vec![
            Particle::at(Vec3::new(-3.0, 0.0, 0.0)),
            Particle::at(Vec3::new(3.0, 0.0, 0.0)),
        ];
        let viewport = Viewport::new(20.0, 20.0);
        let field = ParticleField::from_particles(particles, FieldConfig::default(), viewport);

        assert!(field.edges().is_empty());
    }

    #[test]
    fn pointer_pushes_nearby_particles_away() {
        let particles = vec![Particle::at(Vec3::new(0.5, 0.0, 0.0))];
        let viewport = Viewport::new(10.0, 10.0);
        let mut field = ParticleField::from_particles(particles, FieldConfig::default(), viewport);

        field.update(0.0, Vec2::ZERO);

        let p = field.particles()[0].position;
        // force = (1.8 - 0.5) / 1.8, step = force * 0.02
        assert!((p.x - 0.5144).abs() < 1e-3, "unexpected x: {}", p.x);
    }

    #[test]
    fn pointer_outside_radius_has_no_effect() {
        let particles = vec![Particle::at(Vec3::new(3.0, 0.0, 0.0))];
        let viewport = Viewport::new(10.0, 10.0);
        let mut field = ParticleField::from_particles(particles, FieldConfig::default(), viewport);

        field.update(0.0, Vec2::ZERO);

        // Only the drift applies: sin(0) on x, cos(0) on y
        let p = field.particles()[0].position;
        assert!((p.x - 3.0).abs() < 1e-6);
        assert!((p.y - 0.001).abs() < 1e-6);
    }

    #[test]
    fn buffers_are_reused_across_frames() {
        let mut field =
            ParticleField::new(FieldConfig::default(), Viewport::new(3.0, 3.0), &mut seeded());
        let edge_capacity = field.edges.capacity();
        let line_capacity = field.line_positions.capacity();

        for frame in 0..10 {
            field.update(frame as f32, Vec2::new(0.3, -0.2));
        }

        assert_eq!(field.edges.capacity(), edge_capacity);
        assert_eq!(field.line_positions.capacity(), line_capacity);
        assert!(field.edges().len() <= max_edges(250, 5));
    }

    #[test]
    fn position_buffer_tracks_particles() {
        let mut field =
            ParticleField::new(FieldConfig::default(), Viewport::new(6.0, 4.0), &mut seeded());
        field.update(2.5, Vec2::new(1.0, 1.0));

        let geometry = field.geometry();
        for (i, p) in field.particles().iter().enumerate() {
            assert_eq!(&geometry.positions[i * 3..i * 3 + 3], &p.position.to_array());
        }
    }

    #[test]
    fn max_edges_bounds() {
        assert_eq!(max_edges(250, 5), 1250);
        assert_eq!(max_edges(3, 5), 3);
        assert_eq!(max_edges(0, 5), 0);
        assert_eq!(max_edges(1, 5), 0);
    }
}
