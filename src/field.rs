// The particle field: particles anchored on opaque logo pixels that ease back
// to their anchor and get pushed away when the pointer comes close.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::FieldParams;
use crate::error::Result;
use crate::draw::fill_rect_coverage;
use crate::input::PointerState;
use crate::logo::Logo;
use crate::mask::{build_mask, LogoPlacement};
use crate::types::{Color, FrameBuffer, Mask};

/// One particle. Lives `life` frames, then gets replaced by a fresh sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32, pub y: f32,              // current position in pixels
    pub base_x: i32, pub base_y: i32,    // sampled mask pixel, fixed for life
    pub size: f32,                       // square side in pixels
    pub life: i32,                       // frames left
    pub color: Color,                    // idle colour
    pub scattered_color: Color,          // colour while pushed by the pointer
}

impl Particle {
    /// Ease a fraction `easing` of the remaining distance toward base.
    #[inline]
    pub fn ease_toward_base(&mut self, easing: f32) {
        self.x += (self.base_x as f32 - self.x) * easing;
        self.y += (self.base_y as f32 - self.y) * easing;
    }
}

/// Offset from base that pushes a particle away from the pointer, or `None`
/// when the pointer is outside `radius`.
/// Magnitude is `(radius - d) / radius * displacement`.
pub fn scatter_offset(
    pointer: (f32, f32),
    base: (f32, f32),
    radius: f32,
    displacement: f32,
) -> Option<(f32, f32)> {
    let dx = base.0 - pointer.0;
    let dy = base.1 - pointer.1;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist >= radius {
        return None;
    }
    let force = (radius - dist) / radius;
    // Pointer exactly on the base has no direction; push toward -x.
    let angle = if dist == 0.0 { std::f32::consts::PI } else { dy.atan2(dx) };
    Some((angle.cos() * force * displacement, angle.sin() * force * displacement))
}

/// Result of a (re)seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub requested: usize,
    pub seeded: usize,
    pub failed: usize,
}

/// What one frame did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub scattered: usize,
    pub respawned: usize,
    pub removed: usize,
}

pub struct ParticleField {
    params: FieldParams,
    logo: Logo,
    rng: StdRng,
    width: usize,
    height: usize,
    mobile: bool,
    mask: Mask,
    placement: LogoPlacement,
    particles: Vec<Particle>,
    touch_capable: bool,
}

impl ParticleField {
    /// Build the mask for a `width` x `height` canvas and seed the population.
    /// Fails when `params` do not validate.
    pub fn new(params: FieldParams, logo: Logo, width: usize, height: usize, seed: Option<u64>) -> Result<Self> {
        params.validate()?;
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let (mask, placement) = build_mask(width, height, &logo, &params);
        let mut field = Self {
            mobile: params.is_mobile(width),
            params,
            logo,
            rng,
            width,
            height,
            mask,
            placement,
            particles: Vec::new(),
            touch_capable: false,
        };
        field.seed_population();
        Ok(field)
    }

    /// Touch-capable hosts only scatter while a finger is down.
    pub fn with_touch_capable(mut self, touch_capable: bool) -> Self {
        self.touch_capable = touch_capable;
        self
    }

    pub fn particles(&self) -> &[Particle] { &self.particles }
    pub fn mask(&self) -> &Mask { &self.mask }
    pub fn params(&self) -> &FieldParams { &self.params }
    pub fn size(&self) -> (usize, usize) { (self.width, self.height) }
    pub fn is_mobile(&self) -> bool { self.mobile }
    pub fn placement(&self) -> LogoPlacement { self.placement }
    /// Drawn logo height / natural height. Informational; particle size does
    /// not depend on it.
    pub fn logo_scale(&self) -> f32 { self.placement.scale }

    /// Try up to `sample_attempts` random canvas pixels; anchor a particle on
    /// the first one whose mask alpha is above the threshold.
    pub fn sample_particle(&mut self) -> Option<Particle> {
        if self.mask.is_empty() {
            return None;
        }
        let p = &self.params;
        for _ in 0..p.sample_attempts {
            let x = self.rng.gen_range(0..self.mask.width);
            let y = self.rng.gen_range(0..self.mask.height);
            if self.mask.alpha_at(x, y) > p.alpha_threshold {
                return Some(Particle {
                    x: x as f32,
                    y: y as f32,
                    base_x: x as i32,
                    base_y: y as i32,
                    size: self.rng.gen_range(p.size_min..p.size_max),
                    life: self.rng.gen_range(p.life_min..p.life_max),
                    color: p.idle_color,
                    scattered_color: p.scattered_color,
                });
            }
        }
        None
    }

    /// Replace the population with `target_count` fresh samples. Failed samples
    /// are left out.
    pub fn seed_population(&mut self) -> SeedReport {
        let requested = self.params.target_count(self.width, self.height);
        self.particles.clear();
        self.particles.reserve(requested);
        let mut failed = 0;
        for _ in 0..requested {
            match self.sample_particle() {
                Some(p) => self.particles.push(p),
                None => failed += 1,
            }
        }
        let report = SeedReport { requested, seeded: self.particles.len(), failed };
        if failed > 0 {
            tracing::warn!(
                requested,
                seeded = report.seeded,
                failed,
                "mask sampling exhausted; population below target"
            );
        } else {
            tracing::debug!(seeded = report.seeded, "population seeded");
        }
        report
    }

    /// New canvas size: rebuild the mask and reseed from scratch. All
    /// per-particle state is dropped.
    pub fn resize(&mut self, width: usize, height: usize) -> SeedReport {
        self.width = width;
        self.height = height;
        self.mobile = self.params.is_mobile(width);
        let (mask, placement) = build_mask(width, height, &self.logo, &self.params);
        self.mask = mask;
        self.placement = placement;
        tracing::info!(width, height, mobile = self.mobile, scale = f64::from(placement.scale), "field resized");
        self.seed_population()
    }

    /// Advance every particle one frame and draw it into `fb`, which is
    /// expected to be the field's size.
    pub fn update_and_render(&mut self, fb: &mut FrameBuffer, pointer: &PointerState) -> FrameStats {
        fb.fill(self.params.background);

        let mut stats = FrameStats::default();
        let scatter_enabled = pointer.can_scatter(self.touch_capable);
        let radius = self.params.interaction_radius;
        let displacement = self.params.displacement;
        let easing = self.params.easing;

        let mut i = 0;
        while i < self.particles.len() {
            let p = &mut self.particles[i];
            let base = (p.base_x as f32, p.base_y as f32);

            let offset = if scatter_enabled {
                scatter_offset((pointer.x, pointer.y), base, radius, displacement)
            } else {
                None
            };
            let color = match offset {
                Some((ox, oy)) => {
                    p.x = base.0 + ox;
                    p.y = base.1 + oy;
                    stats.scattered += 1;
                    p.scattered_color
                }
                None => {
                    p.ease_toward_base(easing);
                    p.color
                }
            };

            fill_rect_coverage(fb, p.x, p.y, p.size, p.size, color);

            p.life -= 1;
            if p.life <= 0 {
                match self.sample_particle() {
                    Some(fresh) => {
                        self.particles[i] = fresh;
                        stats.respawned += 1;
                    }
                    None => {
                        // The particle swapped in from the end has not run this frame.
                        self.particles.swap_remove(i);
                        stats.removed += 1;
                        continue;
                    }
                }
            }
            i += 1;
        }

        if stats.removed > 0 {
            tracing::debug!(removed = stats.removed, left = self.particles.len(), "particles expired without replacement");
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEvent;
    use image::{Rgba, RgbaImage};

    fn solid_logo() -> Logo {
        Logo::from_image(RgbaImage::from_pixel(20, 10, Rgba([255, 255, 255, 255]))).unwrap()
    }

    fn field(w: usize, h: usize) -> ParticleField {
        ParticleField::new(FieldParams::default(), solid_logo(), w, h, Some(1)).unwrap()
    }

    #[test]
    fn sampled_particles_sit_on_opaque_pixels() {
        let mut f = field(1920, 1080);
        for p in f.particles() {
            assert!(f.mask().alpha_at(p.base_x as usize, p.base_y as usize) > 128);
            assert_eq!((p.x, p.y), (p.base_x as f32, p.base_y as f32));
            assert!((0.5..1.5).contains(&p.size));
            assert!((50..150).contains(&p.life));
        }
        let extra = f.sample_particle().unwrap();
        assert!(f.mask().alpha_at(extra.base_x as usize, extra.base_y as usize) > 128);
    }

    #[test]
    fn seeding_hits_target_minus_failures() {
        let mut f = field(1280, 720);
        let report = f.seed_population();
        assert_eq!(report.requested, FieldParams::default().target_count(1280, 720));
        assert_eq!(report.seeded + report.failed, report.requested);
        assert_eq!(f.particles().len(), report.seeded);
    }

    #[test]
    fn transparent_logo_seeds_nothing() {
        let logo = Logo::from_image(RgbaImage::new(10, 10)).unwrap();
        let mut f = ParticleField::new(FieldParams::default(), logo, 800, 600, Some(3)).unwrap();
        assert!(f.particles().is_empty());
        assert!(f.sample_particle().is_none());
        let report = f.seed_population();
        assert_eq!(report.seeded, 0);
        assert_eq!(report.failed, report.requested);
    }

    #[test]
    fn zero_area_canvas_has_no_particles() {
        let mut f = field(0, 0);
        assert!(f.particles().is_empty());
        let mut fb = FrameBuffer::new(0, 0);
        let stats = f.update_and_render(&mut fb, &PointerState::default());
        assert_eq!(stats, FrameStats::default());
    }

    #[test]
    fn easing_moves_a_tenth_of_the_gap() {
        let mut p = Particle {
            x: 0.0, y: 100.0, base_x: 50, base_y: 0, size: 1.0, life: 10,
            color: Color::WHITE, scattered_color: Color::WHITE,
        };
        p.ease_toward_base(0.1);
        assert!((p.x - 5.0).abs() < 1e-5);
        assert!((p.y - 90.0).abs() < 1e-5);
    }

    #[test]
    fn scatter_points_away_from_pointer() {
        let (ox, oy) = scatter_offset((100.0, 100.0), (220.0, 100.0), 240.0, 60.0).unwrap();
        assert!((ox - 30.0).abs() < 1e-4);
        assert!(oy.abs() < 1e-4);
        assert!(scatter_offset((0.0, 0.0), (240.0, 0.0), 240.0, 60.0).is_none());
    }

    #[test]
    fn pointer_on_base_pushes_toward_negative_x() {
        let (ox, oy) = scatter_offset((5.0, 5.0), (5.0, 5.0), 240.0, 60.0).unwrap();
        assert!((ox + 60.0).abs() < 1e-4);
        assert!(oy.abs() < 1e-4);
        let (ox, _) = scatter_offset((5.0, 5.0), (5.0, 5.0), 240.0, 30.0).unwrap();
        assert!((ox + 30.0).abs() < 1e-4);
    }

    #[test]
    fn pointer_near_base_scatters_and_recolors() {
        let mut f = field(1920, 1080);
        let mut fb = FrameBuffer::new(1920, 1080);
        let mut pointer = PointerState::default();
        pointer.apply(&InputEvent::PointerMove { x: 960.0, y: 540.0 });

        let before: Vec<Particle> = f.particles().to_vec();
        let stats = f.update_and_render(&mut fb, &pointer);
        assert!(stats.scattered > 0);
        // Scattered squares are off-grid and coverage-blended, so look for a
        // pixel tinted like the scattered colour rather than an exact match.
        assert!(fb.pixels.iter().any(|&px| {
            let c = Color(px);
            c.b() > c.r() && c.g() > c.r()
        }));
        for (old, new) in before.iter().zip(f.particles()) {
            if old.life <= 1 {
                continue; // respawned this frame
            }
            let dx = old.base_x as f32 - 960.0;
            let dy = old.base_y as f32 - 540.0;
            if (dx * dx + dy * dy).sqrt() < 240.0 {
                let d_before = (dx * dx + dy * dy).sqrt();
                let nx = new.x - 960.0;
                let ny = new.y - 540.0;
                assert!((nx * nx + ny * ny).sqrt() >= d_before - 1e-3);
            }
        }
    }

    #[test]
    fn touch_host_ignores_hover() {
        let mut f = field(1920, 1080).with_touch_capable(true);
        let mut fb = FrameBuffer::new(1920, 1080);
        let mut pointer = PointerState::default();
        pointer.apply(&InputEvent::PointerMove { x: 960.0, y: 540.0 });
        assert_eq!(f.update_and_render(&mut fb, &pointer).scattered, 0);

        pointer.apply(&InputEvent::TouchStart);
        assert!(f.update_and_render(&mut fb, &pointer).scattered > 0);

        pointer.apply(&InputEvent::TouchEnd);
        assert_eq!(f.update_and_render(&mut fb, &pointer).scattered, 0);
    }

    #[test]
    fn non_finite_params_are_rejected_before_sampling() {
        let mut params = FieldParams::default();
        params.size_max = f32::INFINITY;
        let result = ParticleField::new(params, solid_logo(), 640, 480, Some(1));
        assert!(matches!(result, Err(crate::error::Error::Config(_))));

        let mut params = FieldParams::default();
        params.interaction_radius = f32::NAN;
        assert!(ParticleField::new(params, solid_logo(), 640, 480, Some(1)).is_err());
    }

    #[test]
    fn expired_particles_are_replaced_or_removed() {
        let mut params = FieldParams::default();
        params.life_min = 1;
        params.life_max = 2;
        let mut f = ParticleField::new(params, solid_logo(), 640, 480, Some(9)).unwrap();
        let n = f.particles().len();
        let mut fb = FrameBuffer::new(640, 480);
        let stats = f.update_and_render(&mut fb, &PointerState::default());
        assert_eq!(stats.respawned + stats.removed, n);
        assert_eq!(f.particles().len(), n - stats.removed);
        assert!(f.particles().iter().all(|p| p.life == 1));
    }

    #[test]
    fn resize_replaces_everything() {
        let mut f = field(1920, 1080);
        assert!(!f.is_mobile());
        let old_height = f.placement().height;
        let report = f.resize(600, 800);
        assert!(f.is_mobile());
        assert_eq!(f.size(), (600, 800));
        assert_eq!(f.mask().width, 600);
        assert_eq!(f.placement().height, old_height / 2);
        assert_eq!(report.seeded, f.particles().len());
        assert!(f.particles().iter().all(|p| (p.base_x as usize) < 600 && (p.base_y as usize) < 800));
    }
}
