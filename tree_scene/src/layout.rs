//! Target transforms for every item in every stage.
//!
//! Tree placement is a pure function of `(i, N)`.  Nebula placement needs
//! random jitter, which is drawn once by [`NebulaPlacement::sample_even`] /
//! [`NebulaPlacement::sample_scattered`] and stored with the item; the
//! transform itself is then again a pure function.

use std::f32::consts::{PI, TAU};

use rand::Rng;

use crate::math::{Color, Euler, EulerOrder, Transform, Vec3};
use crate::stage::Arrangement;

/// Radius of the nebula ring.
pub const NEBULA_RADIUS: f32 = 12.0;
/// Vertical band of the nebula ring: offsets lie in `±NEBULA_BAND / 2`.
pub const NEBULA_BAND: f32 = 2.5;

// ════════════════════════════════════════════════════════════════════════════
// Tree spiral
// ════════════════════════════════════════════════════════════════════════════

/// Cone spiral constants for one kind of item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpiralProfile {
    pub radius_base:   f32,
    pub height:        f32,
    pub start_y:       f32,
    pub end_y:         f32,
    pub radius_offset: f32,
    pub turns:         f32,
}

impl SpiralProfile {
    pub const PHOTO: SpiralProfile = SpiralProfile {
        radius_base:   4.0,
        height:        10.0,
        start_y:       1.0,
        end_y:         8.5,
        radius_offset: 0.52,
        turns:         4.5,
    };

    pub const ORNAMENT: SpiralProfile = SpiralProfile {
        radius_base:   3.5,
        height:        10.0,
        start_y:       0.5,
        end_y:         9.5,
        radius_offset: 0.2,
        turns:         4.0,
    };

    /// Half-angle of the cone, used to tilt items back along its slope.
    pub fn slope(&self) -> f32 {
        (self.radius_base / self.height).atan()
    }
}

/// Vertical progress of item `i` of `n`: `i/(n-1)`, or 0.5 for a lone item.
pub fn spiral_progress(i: usize, n: usize) -> f32 {
    if n <= 1 {
        0.5
    } else {
        i as f32 / (n - 1) as f32
    }
}

/// Tree-stage transform of item `i` of `n` (scale 1).
pub fn tree_transform(profile: &SpiralProfile, i: usize, n: usize) -> Transform {
    let p = spiral_progress(i, n);
    // Bias toward the base so the wide bottom gets more items.
    let y_norm = 1.0 - (1.0 - p * 0.95).sqrt();
    let y      = profile.start_y + y_norm * (profile.end_y - profile.start_y);
    let radius = profile.radius_base * (1.0 - y / profile.height) + profile.radius_offset;
    let theta  = p * TAU * profile.turns;

    let position = Vec3::new(theta.cos() * radius, y, theta.sin() * radius);
    let rotation = Euler::with_order(
        -profile.slope(),
        position.x.atan2(position.z),
        0.0,
        EulerOrder::Yxz,
    );
    Transform::new(position, rotation, 1.0)
}

/// Ornament size tier by vertical progress: bigger baubles near the base.
pub fn ornament_tree_scale(i: usize, n: usize) -> f32 {
    match spiral_progress(i, n) {
        p if p < 0.3 => 1.8,
        p if p < 0.6 => 1.4,
        _            => 1.0,
    }
}

pub fn ornament_tree_transform(i: usize, n: usize) -> Transform {
    Transform { scale: ornament_tree_scale(i, n), ..tree_transform(&SpiralProfile::ORNAMENT, i, n) }
}

pub fn photo_tree_transform(i: usize, n: usize) -> Transform {
    tree_transform(&SpiralProfile::PHOTO, i, n)
}

// ════════════════════════════════════════════════════════════════════════════
// Nebula ring
// ════════════════════════════════════════════════════════════════════════════

pub const PHOTO_NEBULA_SCALE:    f32 = 1.0;
pub const ORNAMENT_NEBULA_SCALE: f32 = 0.6;

/// Per-item nebula jitter, drawn once when the item joins the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NebulaPlacement {
    /// Evenly spaced angle `i/N·2π` on the ring; only the height is random.
    Even { height: f32 },
    /// Free angle and radius.
    Scattered { angle: f32, radius: f32, height: f32 },
}

fn band_offset<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    (rng.gen::<f32>() - 0.5) * NEBULA_BAND
}

impl NebulaPlacement {
    pub fn sample_even<R: Rng + ?Sized>(rng: &mut R) -> Self {
        NebulaPlacement::Even { height: band_offset(rng) }
    }

    /// Angle uniform on the ring, radius within `NEBULA_RADIUS ± spread`.
    pub fn sample_scattered<R: Rng + ?Sized>(rng: &mut R, spread: f32) -> Self {
        let (angle, radius, height) = sample_ring(rng, spread);
        NebulaPlacement::Scattered { angle, radius, height }
    }
}

fn sample_ring<R: Rng + ?Sized>(rng: &mut R, spread: f32) -> (f32, f32, f32) {
    let angle  = rng.gen::<f32>() * TAU;
    let radius = NEBULA_RADIUS + (rng.gen::<f32>() - 0.5) * 2.0 * spread;
    (angle, radius, band_offset(rng))
}

fn ring_point(angle: f32, radius: f32, height: f32) -> Vec3 {
    Vec3::new(angle.cos() * radius, height, angle.sin() * radius)
}

/// Nebula transform of item `i` of `n`; the item faces along the ring.
pub fn nebula_transform(placement: NebulaPlacement, i: usize, n: usize, scale: f32) -> Transform {
    let (angle, radius, height) = match placement {
        NebulaPlacement::Even { height } => (i as f32 / n.max(1) as f32 * TAU, NEBULA_RADIUS, height),
        NebulaPlacement::Scattered { angle, radius, height } => (angle, radius, height),
    };
    Transform::new(ring_point(angle, radius, height), Euler::new(0.0, angle + PI / 2.0, 0.0), scale)
}

// ════════════════════════════════════════════════════════════════════════════
// Focus
// ════════════════════════════════════════════════════════════════════════════

pub const FOCUS_POSITION: Vec3 = Vec3::new(0.0, -1.0, 15.0);
pub const FOCUS_SCALE:    f32  = 1.5;

pub fn focus_transform() -> Transform {
    Transform::new(FOCUS_POSITION, Euler::IDENTITY, FOCUS_SCALE)
}

/// Where a photo should be for the given arrangement.
pub fn photo_target(arrangement: Arrangement, tree: Transform, nebula: Transform, focused: bool) -> Transform {
    match arrangement {
        Arrangement::Tree              => tree,
        Arrangement::Focus if focused  => focus_transform(),
        Arrangement::Nebula | Arrangement::Focus => nebula,
    }
}

pub fn ornament_target(arrangement: Arrangement, tree: Transform, nebula: Transform) -> Transform {
    match arrangement {
        Arrangement::Tree => tree,
        Arrangement::Nebula | Arrangement::Focus => nebula,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Appearance
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
    pub opacity:  f32,
    pub emissive: f32,
}

impl Appearance {
    pub const LIT:    Appearance = Appearance { opacity: 1.0, emissive: 0.2 };
    pub const DIMMED: Appearance = Appearance { opacity: 0.2, emissive: 0.05 };
}

/// Every photo but the focused one is dimmed in focus.
pub fn photo_appearance(arrangement: Arrangement, focused: bool) -> Appearance {
    if arrangement == Arrangement::Focus && !focused {
        Appearance::DIMMED
    } else {
        Appearance::LIT
    }
}

pub fn ornament_opacity(arrangement: Arrangement) -> f32 {
    if arrangement == Arrangement::Focus { 0.2 } else { 1.0 }
}

pub fn particle_opacity(arrangement: Arrangement) -> f32 {
    if arrangement == Arrangement::Focus { 0.2 } else { 0.8 }
}

const ORNAMENT_PALETTE: [u32; 4] = [0xFF4D4D, 0xB5E5FF, 0xFF8A9C, 0xF5F5F5];

/// Ornament colours cycle through a fixed palette by index.
pub fn ornament_color(i: usize) -> Color {
    Color::from_hex(ORNAMENT_PALETTE[i % ORNAMENT_PALETTE.len()])
}

// ════════════════════════════════════════════════════════════════════════════
// Particle cloud
// ════════════════════════════════════════════════════════════════════════════

pub const PARTICLE_HEIGHT:        f32 = 10.0;
pub const PARTICLE_RADIUS:        f32 = 4.0;
pub const PARTICLE_NOISE:         f32 = 0.2;
pub const PARTICLE_NEBULA_SPREAD: f32 = 1.5;

/// `(colour, cumulative weight)`: silver 30 %, pale silver 30 %, gold 40 %.
const PARTICLE_PALETTE: [(u32, f32); 3] = [(0xC0C0C0, 0.3), (0xE8E8E8, 0.6), (0xFFD700, 1.0)];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub tree:   Vec3,
    pub nebula: Vec3,
    pub color:  Color,
}

fn palette_pick(roll: f32) -> Color {
    let hex = PARTICLE_PALETTE
        .iter()
        .find(|(_, upto)| roll < *upto)
        .map_or(PARTICLE_PALETTE[PARTICLE_PALETTE.len() - 1].0, |(hex, _)| *hex);
    Color::from_hex(hex)
}

/// Draw the whole particle cloud: a filled cone for the tree, a thick ring
/// for the nebula.
pub fn sample_particles<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            let y      = rng.gen::<f32>() * PARTICLE_HEIGHT;
            let radius = PARTICLE_RADIUS * (1.0 - y / PARTICLE_HEIGHT)
                + (rng.gen::<f32>() - 0.5) * 2.0 * PARTICLE_NOISE;
            let theta  = rng.gen::<f32>() * TAU;
            let tree   = Vec3::new(theta.cos() * radius, y, theta.sin() * radius);

            let (angle, ring, height) = sample_ring(rng, PARTICLE_NEBULA_SPREAD);
            let nebula = ring_point(angle, ring, height);
            Particle { tree, nebula, color: palette_pick(rng.gen()) }
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn tree_layout_is_deterministic() {
        for n in [1, 2, 7, 40] {
            for i in 0..n {
                let a = photo_tree_transform(i, n);
                let b = photo_tree_transform(i, n);
                assert_eq!(a.position.x.to_bits(), b.position.x.to_bits());
                assert_eq!(a.position.y.to_bits(), b.position.y.to_bits());
                assert_eq!(a.position.z.to_bits(), b.position.z.to_bits());
                assert_eq!(a.rotation, b.rotation);
            }
        }
    }

    #[test]
    fn single_item_sits_mid_spiral() {
        assert_eq!(spiral_progress(0, 1), 0.5);
        assert_eq!(spiral_progress(0, 0), 0.5);
        assert_eq!(spiral_progress(3, 4), 1.0);
    }

    #[test]
    fn spiral_climbs_and_narrows() {
        let n = 20;
        let bottom = photo_tree_transform(0, n);
        let top    = photo_tree_transform(n - 1, n);
        assert!((bottom.position.y - SpiralProfile::PHOTO.start_y).abs() < 1e-6);
        assert!(top.position.y > bottom.position.y);
        let radial = |t: Transform| (t.position.x.powi(2) + t.position.z.powi(2)).sqrt();
        assert!(radial(top) < radial(bottom));
        for i in 0..n {
            assert!(photo_tree_transform(i, n).position.y <= SpiralProfile::PHOTO.end_y);
        }
    }

    #[test]
    fn tree_items_face_outward_with_slope_tilt() {
        let t = photo_tree_transform(5, 12);
        assert_eq!(t.rotation.order, EulerOrder::Yxz);
        assert!((t.rotation.x + (4.0f32 / 10.0).atan()).abs() < 1e-6);
        assert!((t.rotation.y - t.position.x.atan2(t.position.z)).abs() < 1e-6);
    }

    #[test]
    fn ornament_scale_tiers() {
        let n = 11;
        assert_eq!(ornament_tree_scale(0, n), 1.8);
        assert_eq!(ornament_tree_scale(2, n), 1.8);
        assert_eq!(ornament_tree_scale(3, n), 1.4);
        assert_eq!(ornament_tree_scale(5, n), 1.4);
        assert_eq!(ornament_tree_scale(6, n), 1.0);
        assert_eq!(ornament_tree_transform(0, n).scale, 1.8);
    }

    #[test]
    fn even_nebula_spacing() {
        let p = NebulaPlacement::Even { height: 0.0 };
        let a = nebula_transform(p, 0, 4, PHOTO_NEBULA_SCALE);
        let b = nebula_transform(p, 1, 4, PHOTO_NEBULA_SCALE);
        assert!((a.position.distance(Vec3::new(NEBULA_RADIUS, 0.0, 0.0))) < 1e-5);
        assert!((b.position.distance(Vec3::new(0.0, 0.0, NEBULA_RADIUS))) < 1e-4);
        assert!((b.rotation.y - PI).abs() < 1e-6);
    }

    #[test]
    fn scattered_jitter_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            match NebulaPlacement::sample_scattered(&mut rng, 2.0) {
                NebulaPlacement::Scattered { angle, radius, height } => {
                    assert!((0.0..TAU).contains(&angle));
                    assert!((10.0..=14.0).contains(&radius));
                    assert!(height.abs() <= NEBULA_BAND / 2.0);
                }
                other => panic!("unexpected placement {:?}", other),
            }
        }
    }

    #[test]
    fn focus_pulls_only_the_focused_photo() {
        let tree   = photo_tree_transform(0, 3);
        let nebula = nebula_transform(NebulaPlacement::Even { height: 0.3 }, 0, 3, 1.0);
        assert_eq!(photo_target(Arrangement::Focus, tree, nebula, true), focus_transform());
        assert_eq!(photo_target(Arrangement::Focus, tree, nebula, false), nebula);
        assert_eq!(photo_target(Arrangement::Tree, tree, nebula, true), tree);
        assert_eq!(photo_appearance(Arrangement::Focus, false), Appearance::DIMMED);
        assert_eq!(photo_appearance(Arrangement::Focus, true), Appearance::LIT);
        assert_eq!(photo_appearance(Arrangement::Nebula, false), Appearance::LIT);
    }

    #[test]
    fn particle_palette_weights() {
        let mut rng = StdRng::seed_from_u64(11);
        let cloud = sample_particles(6000, &mut rng);
        let gold = Color::from_hex(0xFFD700);
        let share = cloud.iter().filter(|p| p.color == gold).count() as f32 / cloud.len() as f32;
        assert!((share - 0.4).abs() < 0.03, "gold share {}", share);
        for p in &cloud {
            assert!((0.0..PARTICLE_HEIGHT).contains(&p.tree.y));
            let ring = (p.nebula.x.powi(2) + p.nebula.z.powi(2)).sqrt();
            assert!((ring - NEBULA_RADIUS).abs() <= PARTICLE_NEBULA_SPREAD + 1e-4);
        }
    }

    #[test]
    fn ornament_palette_cycles() {
        assert_eq!(ornament_color(0), ornament_color(4));
        assert_ne!(ornament_color(0), ornament_color(1));
    }
}
