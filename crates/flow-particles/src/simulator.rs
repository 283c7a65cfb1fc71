//! The particle simulator: evolve, bucket by speed, draw.

use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

use flow_common::style::IntensityRamp;
use flow_common::Rgba;
use flow_field::{Field, FieldSample};

/// Frames a particle lives before it respawns at a random position.
pub const MAX_PARTICLE_AGE: u32 = 100;

/// Particles per pixel of view width. Arbitrary value chosen for aesthetics.
pub const PARTICLE_MULTIPLIER: f64 = 7.0;

/// Particle count multiplier for devices that struggle with the full load.
pub const PARTICLE_REDUCTION: f64 = 0.75;

/// Fraction of the previous frame's intensity kept when fading trails.
pub const TRAIL_FADE: f64 = 0.97;

/// One animated particle. `(x, y)` is the drawn position, `(xt, yt)` the
/// tentative position for the next frame.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub xt: f64,
    pub yt: f64,
    pub age: u32,
}

/// A trail segment from a particle's current to its next position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSegment {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// Drawing surface for one animation frame.
///
/// The simulator calls `fade` once per frame, then `stroke` once per
/// non-empty speed bucket. Implementations map onto whatever canvas the
/// host provides.
pub trait TrailRenderer {
    /// Dim the previous frame, keeping `keep` of its intensity.
    fn fade(&mut self, keep: f64);

    /// Stroke a batch of segments in a single color.
    fn stroke(&mut self, color: Rgba, segments: &[TrailSegment]);
}

#[derive(Debug, Clone, Copy)]
pub struct SimulatorOptions {
    pub max_age: u32,
    pub multiplier: f64,
    /// Spawn fewer particles, for constrained devices.
    pub reduced: bool,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            max_age: MAX_PARTICLE_AGE,
            multiplier: PARTICLE_MULTIPLIER,
            reduced: false,
        }
    }
}

/// Advects a fixed population of particles along a field.
///
/// The population size scales with the view width. Particles are born with
/// random ages so the population does not respawn in lockstep.
///
/// The simulator does not hold on to a field: the caller passes the latest
/// published one into each `evolve`, so a rebuild (or an early `release`)
/// between ticks takes effect immediately.
pub struct Simulator {
    ramp: IntensityRamp,
    options: SimulatorOptions,
    particles: Vec<Particle>,
    /// Particle indices per ramp bucket, rebuilt by each `evolve`.
    buckets: Vec<Vec<usize>>,
}

impl Simulator {
    pub fn new(field: &Field, ramp: IntensityRamp, options: SimulatorOptions) -> Self {
        let mut count = (field.bounds().width() as f64 * options.multiplier).round() as usize;
        if options.reduced {
            count = (count as f64 * PARTICLE_REDUCTION).round() as usize;
        }
        debug!(count, buckets = ramp.len(), "spawning particles");

        let mut rng = rand::thread_rng();
        let particles = (0..count)
            .map(|_| {
                let (x, y) = field.randomize(&mut rng);
                Particle {
                    x,
                    y,
                    xt: x,
                    yt: y,
                    age: rng.gen_range(0..=options.max_age),
                }
            })
            .collect();

        let buckets = vec![Vec::new(); ramp.len()];
        Self {
            ramp,
            options,
            particles,
            buckets,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Advance every particle one frame.
    ///
    /// Over-age particles respawn at a random defined pixel. A particle
    /// whose current pixel has no flow (a hole, or it drifted off the
    /// globe) is aged out immediately and respawns next frame. A particle
    /// whose tentative next pixel is undefined moves there silently, so
    /// trails do not smear across holes.
    pub fn evolve(&mut self, field: &Field) {
        let ramp = &self.ramp;
        let max_age = self.options.max_age;

        let assignments: Vec<Option<usize>> = self
            .particles
            .par_iter_mut()
            .map(|p| {
                if p.age > max_age {
                    let mut rng = rand::thread_rng();
                    let (x, y) = field.randomize(&mut rng);
                    p.x = x;
                    p.y = y;
                    p.age = 0;
                }
                let bucket = match field.sample(p.x, p.y) {
                    FieldSample::Vector { u, v, magnitude } => {
                        let xt = p.x + u;
                        let yt = p.y + v;
                        if field.is_defined(xt, yt) {
                            p.xt = xt;
                            p.yt = yt;
                            Some(ramp.index_for(magnitude))
                        } else {
                            // Jump without drawing a segment.
                            p.x = xt;
                            p.y = yt;
                            None
                        }
                    }
                    _ => {
                        p.age = max_age;
                        None
                    }
                };
                p.age += 1;
                bucket
            })
            .collect();

        for bucket in &mut self.buckets {
            bucket.clear();
        }
        for (i, bucket) in assignments.into_iter().enumerate() {
            if let Some(b) = bucket {
                self.buckets[b].push(i);
            }
        }
    }

    /// Draw the evolved frame, then commit tentative positions.
    pub fn draw(&mut self, renderer: &mut dyn TrailRenderer) {
        renderer.fade(TRAIL_FADE);

        let buckets = std::mem::take(&mut self.buckets);
        for (b, bucket) in buckets.iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            let segments: Vec<TrailSegment> = bucket
                .iter()
                .map(|&i| {
                    let p = &self.particles[i];
                    TrailSegment {
                        x0: p.x,
                        y0: p.y,
                        x1: p.xt,
                        y1: p.yt,
                    }
                })
                .collect();
            renderer.stroke(self.ramp.color(b), &segments);

            for &i in bucket {
                let p = &mut self.particles[i];
                p.x = p.xt;
                p.y = p.yt;
            }
        }
        self.buckets = buckets;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_common::style::ColorScale;
    use flow_common::ViewBounds;
    use flow_field::{build, CancelToken, FieldSpec, Mask};
    use flow_grid::grid::VectorGrid;
    use flow_grid::record::GridRecord;
    use flow_projection::{Equirectangular, Projection};
    use test_utils::{scalar_record, uniform_vector_records};

    struct Recorder {
        fades: usize,
        strokes: Vec<(Rgba, Vec<TrailSegment>)>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                fades: 0,
                strokes: Vec::new(),
            }
        }
    }

    impl TrailRenderer for Recorder {
        fn fade(&mut self, keep: f64) {
            assert!((keep - TRAIL_FADE).abs() < 1e-12);
            self.fades += 1;
        }

        fn stroke(&mut self, color: Rgba, segments: &[TrailSegment]) {
            self.strokes.push((color, segments.to_vec()));
        }
    }

    fn build_field(records: Option<(serde_json::Value, serde_json::Value)>) -> Field {
        let (u, v) = records.unwrap_or_else(|| uniform_vector_records(36, 19, 3.0, 4.0));
        let flow = VectorGrid::from_records(
            GridRecord::from_json(u).unwrap(),
            GridRecord::from_json(v).unwrap(),
        )
        .unwrap();
        let projection = Equirectangular::new(0.0, 1.0, (10.0, 10.0));
        let scale = ColorScale::ExtendedSinebow { max: 100.0 };
        let spec = FieldSpec {
            projection: &projection as &dyn Projection,
            flow: &flow,
            overlay: None,
            scale: &scale,
            velocity_scale: 1.0 / 600.0,
            bounds: ViewBounds::full(20, 20),
        };
        build(&spec, Mask::full(20, 20), &CancelToken::new()).unwrap()
    }

    fn ramp() -> IntensityRamp {
        IntensityRamp::grayscale(10, 17.0)
    }

    #[test]
    fn test_population_scales_with_width() {
        let field = build_field(None);
        let sim = Simulator::new(&field, ramp(), SimulatorOptions::default());
        assert_eq!(sim.particles().len(), (20.0 * PARTICLE_MULTIPLIER) as usize);

        let reduced = Simulator::new(
            &field,
            ramp(),
            SimulatorOptions {
                reduced: true,
                ..SimulatorOptions::default()
            },
        );
        assert_eq!(
            reduced.particles().len(),
            (20.0 * PARTICLE_MULTIPLIER * PARTICLE_REDUCTION) as usize
        );
    }

    #[test]
    fn test_evolve_moves_particles_along_flow() {
        let field = build_field(None);
        let mut sim = Simulator::new(&field, ramp(), SimulatorOptions::default());
        // Pin one particle to the center where flow is uniform and defined.
        {
            let p = &mut sim.particles_mut()[0];
            p.x = 10.0;
            p.y = 10.0;
            p.age = 0;
        }
        sim.evolve(&field);
        let p = sim.particles()[0];
        // Flow is (3, 4) geographic; screen motion keeps the u sign and
        // flips v (screen y grows downward).
        assert!(p.xt > p.x);
        assert!(p.yt < p.y);
        assert_eq!(p.age, 1);
    }

    #[test]
    fn test_hole_at_current_position_ages_particle_out() {
        // Only cell of the grid has a missing corner, so the whole viewport
        // samples as a hole.
        let u = scalar_record(
            0.0,
            10.0,
            20.0,
            20.0,
            2,
            2,
            &[None, Some(1.0), Some(1.0), Some(1.0)],
        );
        let v = scalar_record(0.0, 10.0, 20.0, 20.0, 2, 2, &[Some(1.0); 4]);
        let field = build_field(Some((u, v)));
        let mut sim = Simulator::new(&field, ramp(), SimulatorOptions::default());
        {
            let p = &mut sim.particles_mut()[0];
            p.x = 10.0;
            p.y = 5.0;
            p.age = 0;
        }
        sim.evolve(&field);
        let p = sim.particles()[0];
        assert_eq!(p.age, MAX_PARTICLE_AGE + 1);
        // Position unchanged; no segment was produced for it.
        assert_eq!((p.x, p.y), (10.0, 5.0));
    }

    #[test]
    fn test_draw_fades_strokes_and_commits() {
        let field = build_field(None);
        let mut sim = Simulator::new(&field, ramp(), SimulatorOptions::default());
        sim.evolve(&field);

        let drawn: Vec<usize> = sim
            .buckets
            .iter()
            .flat_map(|b| b.iter().copied())
            .collect();
        assert!(!drawn.is_empty(), "uniform field should move particles");
        let expected: Vec<(f64, f64)> =
            drawn.iter().map(|&i| {
                let p = sim.particles()[i];
                (p.xt, p.yt)
            })
            .collect();

        let mut recorder = Recorder::new();
        sim.draw(&mut recorder);

        assert_eq!(recorder.fades, 1);
        let segments: usize = recorder.strokes.iter().map(|(_, s)| s.len()).sum();
        assert_eq!(segments, drawn.len());
        // Tentative positions became current.
        for (&i, &(xt, yt)) in drawn.iter().zip(expected.iter()) {
            let p = sim.particles()[i];
            assert_eq!((p.x, p.y), (xt, yt));
        }
    }

    #[test]
    fn test_respawned_particle_gets_fresh_age() {
        let field = build_field(None);
        let mut sim = Simulator::new(&field, ramp(), SimulatorOptions::default());
        {
            let p = &mut sim.particles_mut()[0];
            p.age = MAX_PARTICLE_AGE + 1;
        }
        sim.evolve(&field);
        // Respawn resets to 0, then the frame's increment applies.
        assert!(sim.particles()[0].age <= 1);
    }
}
