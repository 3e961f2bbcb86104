//! Software-rendered visualizer using `minifb`.
//!
//! Implements [`RenderingEngine`]: the animator writes node transforms and
//! materials during the frame, `present` projects everything through a
//! pinhole camera and rasterizes it into the framebuffer.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                   ◆  topper                  │
//! │        ▫ photos   ● ornaments   · particles  │
//! │                                              │
//! │              [ wish overlay ]                │
//! ├──────────────────────────────────────────────┤
//! │ status bar                                   │
//! │ key legend                                   │
//! └──────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use hand_gesture::GestureKind;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use tree_scene::render::NodeTable;
use tree_scene::{
    CameraPose, Color, NodeId, ParticleFrame, PhotoRef, RenderingEngine, SceneError, SceneNode,
    Stage, Transform, Vec3,
};

use crate::app::Command;
use crate::config::WindowConfig;
use crate::tracking::{SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Constants
// ════════════════════════════════════════════════════════════════════════════

const FOV_DEG:        f32 = 45.0;
const NEAR:           f32 = 0.1;
const STATUS_H:       usize = 34;
const BG_TOP:         u32 = 0xFF05070F;
const BG_BOTTOM:      u32 = 0xFF14182B;
const STATUS_BG:      u32 = 0xFF0F1A33;
const CARD_FRAME:     u32 = 0xFFF5F5F5;
const TEXT_COLOR:     u32 = 0xFFEEEEEE;
const LEGEND_COLOR:   u32 = 0xFF888888;
const WISH_COLOR:     u32 = 0xFFFFD700;
const ORNAMENT_RADIUS: f32 = 0.25;
const TOPPER_RADIUS:   f32 = 0.8;
const SAMPLE_BATCH:    usize = 3;

const LEGEND: &str =
    "hold 1=palm 2=fist 3=point 4=victory  T/N/F=stage  W=wish  C=camera  P=photos  X=drop frame  Q=quit";

// ════════════════════════════════════════════════════════════════════════════
// Projector — pinhole camera
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
pub struct Projector {
    eye:     Vec3,
    right:   Vec3,
    up:      Vec3,
    forward: Vec3,
    focal:   f32,
    cx:      f32,
    cy:      f32,
}

impl Projector {
    pub fn new(pose: CameraPose, width: usize, height: usize) -> Self {
        let forward = (pose.target - pose.position).normalized();
        let mut right = forward.cross(Vec3::UP);
        if right.length() < 1e-6 {
            right = Vec3::new(1.0, 0.0, 0.0);
        }
        let right = right.normalized();
        let up = right.cross(forward);
        let half_fov = (FOV_DEG.to_radians() / 2.0).tan();
        Projector {
            eye: pose.position,
            right,
            up,
            forward,
            focal: height as f32 / 2.0 / half_fov,
            cx: width as f32 / 2.0,
            cy: height as f32 / 2.0,
        }
    }

    /// Screen position and depth of a world point, `None` behind the camera.
    pub fn project(&self, p: Vec3) -> Option<(f32, f32, f32)> {
        let d = p - self.eye;
        let depth = d.dot(self.forward);
        if depth < NEAR {
            return None;
        }
        let s = self.focal / depth;
        Some((self.cx + d.dot(self.right) * s, self.cy - d.dot(self.up) * s, depth))
    }

    /// Pixels per world unit at `depth`.
    pub fn pixels_per_unit(&self, depth: f32) -> f32 {
        self.focal / depth.max(NEAR)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas — ARGB framebuffer and primitives
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub width:  usize,
    pub height: usize,
    pub buf:    Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { width, height, buf: vec![BG_TOP; width * height] }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    pub fn clear_gradient(&mut self, top: u32, bottom: u32) {
        for row in 0..self.height {
            let c = blend(top, bottom, row as f32 / self.height.max(1) as f32);
            self.buf[row * self.width..(row + 1) * self.width].fill(c);
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    /// Composite `color` over the pixel with coverage `alpha`.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: u32, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let i = y as usize * self.width + x as usize;
        self.buf[i] = blend(self.buf[i], color, alpha);
    }

    /// Filled triangle by edge functions over its bounding box.
    pub fn fill_triangle(&mut self, a: (f32, f32), b: (f32, f32), c: (f32, f32), color: u32, alpha: f32) {
        let edge = |p: (f32, f32), q: (f32, f32), x: f32, y: f32| (q.0 - p.0) * (y - p.1) - (q.1 - p.1) * (x - p.0);
        let area = edge(a, b, c.0, c.1);
        if area.abs() < 1e-6 {
            return;
        }
        let x0 = a.0.min(b.0).min(c.0).floor().max(0.0) as i32;
        let x1 = a.0.max(b.0).max(c.0).ceil().min(self.width as f32 - 1.0) as i32;
        let y0 = a.1.min(b.1).min(c.1).floor().max(0.0) as i32;
        let y1 = a.1.max(b.1).max(c.1).ceil().min(self.height as f32 - 1.0) as i32;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b, c, px, py) / area;
                let w1 = edge(c, a, px, py) / area;
                let w2 = edge(a, b, px, py) / area;
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    self.blend_pixel(x, y, color, alpha);
                }
            }
        }
    }

    pub fn fill_quad(&mut self, q: [(f32, f32); 4], color: u32, alpha: f32) {
        self.fill_triangle(q[0], q[1], q[2], color, alpha);
        self.fill_triangle(q[0], q[2], q[3], color, alpha);
    }

    fn clip_box(&self, cx: f32, cy: f32, r: f32) -> (i32, i32, i32, i32) {
        let clamp = |v: f32, hi: usize| v.clamp(-1.0, hi as f32) as i32;
        (
            clamp((cx - r).floor(), self.width),
            clamp((cx + r).ceil(), self.width),
            clamp((cy - r).floor(), self.height),
            clamp((cy + r).ceil(), self.height),
        )
    }

    pub fn fill_disc(&mut self, cx: f32, cy: f32, r: f32, color: u32, alpha: f32) {
        let r = r.max(0.5);
        let (x0, x1, y0, y1) = self.clip_box(cx, cy, r);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let (dx, dy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
                if dx * dx + dy * dy <= r * r {
                    self.blend_pixel(x, y, color, alpha);
                }
            }
        }
    }

    /// Filled diamond (|dx| + |dy| ≤ r).
    pub fn fill_diamond(&mut self, cx: f32, cy: f32, r: f32, color: u32, alpha: f32) {
        let r = r.max(0.5);
        let (x0, x1, y0, y1) = self.clip_box(cx, cy, r);
        for y in y0..=y1 {
            for x in x0..=x1 {
                if (x as f32 + 0.5 - cx).abs() + (y as f32 + 0.5 - cy).abs() <= r {
                    self.blend_pixel(x, y, color, alpha);
                }
            }
        }
    }

    /// 3×5 bitmap text, each dot `scale` pixels square.
    pub fn draw_text(&mut self, text: &str, x: usize, y: usize, color: u32, scale: usize) {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            let bits = glyph(ch);
            for row in 0..5 {
                for col in 0..3 {
                    if bits & (1 << (14 - row * 3 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale;
            if cx + 4 * scale > self.width {
                break;
            }
        }
    }

    pub fn text_width(text: &str, scale: usize) -> usize {
        text.chars().count() * 4 * scale.max(1)
    }
}

/// 3×5 glyph, rows top to bottom, three bits per row.
fn glyph(c: char) -> u16 {
    match c {
        '0'       => 0b111_101_101_101_111,
        '1'       => 0b010_110_010_010_111,
        '2'       => 0b111_001_111_100_111,
        '3'       => 0b111_001_111_001_111,
        '4'       => 0b101_101_111_001_001,
        '5'       => 0b111_100_111_001_111,
        '6'       => 0b111_100_111_101_111,
        '7'       => 0b111_001_001_001_001,
        '8'       => 0b111_101_111_101_111,
        '9'       => 0b111_101_111_001_111,
        'a' | 'A' => 0b111_101_111_101_101,
        'b' | 'B' => 0b110_101_110_101_110,
        'c' | 'C' => 0b111_100_100_100_111,
        'd' | 'D' => 0b110_101_101_101_110,
        'e' | 'E' => 0b111_100_111_100_111,
        'f' | 'F' => 0b111_100_111_100_100,
        'g' | 'G' => 0b111_100_101_101_111,
        'h' | 'H' => 0b101_101_111_101_101,
        'i' | 'I' => 0b111_010_010_010_111,
        'j' | 'J' => 0b001_001_001_101_111,
        'k' | 'K' => 0b101_101_110_101_101,
        'l' | 'L' => 0b100_100_100_100_111,
        'm' | 'M' => 0b101_111_101_101_101,
        'n' | 'N' => 0b111_101_101_101_101,
        'o' | 'O' => 0b111_101_101_101_111,
        'p' | 'P' => 0b111_101_111_100_100,
        'r' | 'R' => 0b110_101_110_101_101,
        's' | 'S' => 0b111_100_111_001_111,
        't' | 'T' => 0b111_010_010_010_010,
        'u' | 'U' => 0b101_101_101_101_111,
        'v' | 'V' => 0b101_101_101_010_010,
        'w' | 'W' => 0b101_101_101_111_101,
        'x' | 'X' => 0b101_101_010_101_101,
        'y' | 'Y' => 0b101_101_111_010_010,
        'z' | 'Z' => 0b111_001_010_100_111,
        '/'       => 0b001_001_010_100_100,
        '-'       => 0b000_000_111_000_000,
        '.'       => 0b000_000_000_000_010,
        ','       => 0b000_000_000_010_100,
        ':'       => 0b000_010_000_010_000,
        '='       => 0b000_111_000_111_000,
        '+'       => 0b000_010_111_010_000,
        ' '       => 0b000_000_000_000_000,
        'q' | 'Q' => 0b111_101_101_111_001,
        '!'       => 0b010_010_010_000_010,
        '('       => 0b001_010_010_010_001,
        ')'       => 0b100_010_010_010_100,
        '\''      => 0b010_010_000_000_000,
        '>'       => 0b100_010_001_010_100,
        '#'       => 0b101_111_101_111_101,
        '%'       => 0b101_001_010_100_101,
        _         => 0b000_000_010_000_000,
    }
}

/// Mix two ARGB colours: `t` = 0 gives `a`, `t` = 1 gives `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let ch = |shift: u32| {
        let (ca, cb) = ((a >> shift) & 0xFF, (b >> shift) & 0xFF);
        ((ca as f32 * (1.0 - t) + cb as f32 * t).round() as u32) << shift
    };
    0xFF000000 | ch(16) | ch(8) | ch(0)
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

/// What the status bar shows besides the stage.
#[derive(Clone, Debug, Default)]
pub struct Hud {
    pub stage:   Stage,
    pub camera:  bool,
    pub photos:  usize,
    pub status:  String,
    pub wish:    Option<String>,
}

pub struct Visualizer {
    window:     Window,
    canvas:     Canvas,
    sim_tx:     Sender<SimInput>,
    started:    Instant,
    nodes:      NodeTable,
    camera:     CameraPose,
    particles:  Vec<(Vec3, u32)>,
    particle_opacity: f32,
    particle_spin:    f32,
    held_pose:  Option<GestureKind>,
    samples:    usize,
    pub hud:    Hud,
}

impl Visualizer {
    pub fn new(cfg: &WindowConfig, sim_tx: Sender<SimInput>) -> Result<Self, SceneError> {
        let mut window = Window::new(
            &cfg.title,
            cfg.width,
            cfg.height,
            WindowOptions { resize: false, ..WindowOptions::default() },
        )
        .map_err(|e| SceneError::render(e.to_string()))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas:           Canvas::new(cfg.width, cfg.height),
            sim_tx,
            started:          Instant::now(),
            nodes:            NodeTable::default(),
            camera:           CameraPose { position: Vec3::new(0.0, 5.0, 20.0), target: Vec3::ZERO },
            particles:        Vec::new(),
            particle_opacity: 0.8,
            particle_spin:    0.0,
            held_pose:        None,
            samples:          0,
            hud:              Hud::default(),
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Translate keys: poses go to the hand simulator, everything else
    /// comes back as app commands.
    pub fn poll_input(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        if !self.window.is_open() {
            commands.push(Command::Quit);
            return commands;
        }

        let window = &self.window;
        let pressed = |k: Key| window.is_key_pressed(k, KeyRepeat::No);

        if pressed(Key::Q) || pressed(Key::Escape) {
            commands.push(Command::Quit);
        }
        if pressed(Key::T) { commands.push(Command::SetStage(Stage::Tree)); }
        if pressed(Key::N) { commands.push(Command::SetStage(Stage::Nebula)); }
        if pressed(Key::F) { commands.push(Command::SetStage(Stage::Focus)); }
        if pressed(Key::W) { commands.push(Command::ToggleWish); }
        if pressed(Key::C) { commands.push(Command::ToggleCamera); }
        let add_photos = pressed(Key::P);
        let drop_frame = pressed(Key::X);

        if add_photos {
            let batch = self.sample_batch();
            commands.push(Command::AddPhotos(batch));
        }
        if drop_frame {
            let _ = self.sim_tx.send(SimInput::DropFrame);
        }

        // Held pose keys
        let pose = [
            (Key::Key1, SimKey::Palm),
            (Key::Key2, SimKey::Fist),
            (Key::Key3, SimKey::Pointing),
            (Key::Key4, SimKey::Victory),
        ]
        .into_iter()
        .find(|(k, _)| self.window.is_key_down(*k))
        .map(|(_, s)| s.gesture());

        if pose != self.held_pose {
            self.held_pose = pose;
            let _ = self.sim_tx.send(SimInput::Pose(pose));
        }
        commands
    }

    fn sample_batch(&mut self) -> Vec<PhotoRef> {
        let start = self.samples;
        self.samples += SAMPLE_BATCH;
        (start..self.samples)
            .filter_map(|i| PhotoRef::new(format!("sample-{:02}.jpg", i + 1)).ok())
            .collect()
    }

    // ── frame composition ────────────────────────────────────────────────

    fn group(&self) -> Transform {
        self.nodes.get(NodeId::Group).map(|n| n.transform).unwrap_or_default()
    }

    fn draw_scene(&mut self) {
        let (w, h) = (self.canvas.width, self.canvas.height - STATUS_H);
        let proj  = Projector::new(self.camera, w, h);
        let group = self.group();

        // Particles first; they sit behind and between everything.
        let spin = self.particle_spin;
        for &(p, color) in &self.particles {
            if let Some((sx, sy, _)) = proj.project(group.apply(p.rotate_y(spin))) {
                self.canvas.blend_pixel(sx as i32, sy as i32, color, self.particle_opacity);
            }
        }

        // Items back to front.
        let mut items: Vec<(f32, NodeId, tree_scene::render::NodeState)> = self
            .nodes
            .sorted()
            .into_iter()
            .filter(|(id, _)| *id != NodeId::Group)
            .filter_map(|(id, n)| {
                let (_, _, depth) = proj.project(group.apply(n.transform.position))?;
                Some((depth, id, n))
            })
            .collect();
        items.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (depth, id, node) in items {
            let t = node.transform;
            let m = node.material;
            if m.opacity <= 0.0 || t.scale <= 0.0 {
                continue;
            }
            match id {
                NodeId::Photo(_) => {
                    let corners = |hw: f32, y0: f32, y1: f32| {
                        [(-hw, y1), (hw, y1), (hw, y0), (-hw, y0)]
                            .map(|(x, y)| proj.project(group.apply(t.apply(Vec3::new(x, y, 0.0)))))
                    };
                    let frame = corners(0.5, -0.6, 0.6);
                    let image = corners(0.42, -0.35, 0.52);
                    let fill = blend(m.color.to_argb(), 0xFFFFFFFF, m.emissive * 0.5);
                    if let Some(q) = screen_quad(frame) {
                        self.canvas.fill_quad(q, CARD_FRAME, m.opacity);
                    }
                    if let Some(q) = screen_quad(image) {
                        self.canvas.fill_quad(q, fill, m.opacity);
                    }
                }
                NodeId::Ornament(_) => {
                    if let Some((sx, sy, _)) = proj.project(group.apply(t.position)) {
                        let r = ORNAMENT_RADIUS * t.scale * proj.pixels_per_unit(depth);
                        let c = blend(m.color.to_argb(), 0xFFFFFFFF, m.emissive);
                        self.canvas.fill_disc(sx, sy, r, c, m.opacity);
                    }
                }
                NodeId::Topper => {
                    if let Some((sx, sy, _)) = proj.project(group.apply(t.position)) {
                        let r = TOPPER_RADIUS * t.scale * proj.pixels_per_unit(depth);
                        let glow = (m.emissive / 4.0).clamp(0.0, 1.0);
                        self.canvas.fill_disc(sx, sy, r * 1.6, m.color.to_argb(), 0.15 * glow);
                        self.canvas.fill_diamond(sx, sy, r, blend(m.color.to_argb(), 0xFFFFFFFF, glow * 0.4), m.opacity);
                    }
                }
                NodeId::Group => {}
            }
        }
    }

    fn draw_hud(&mut self) {
        let (w, h) = (self.canvas.width, self.canvas.height);

        if let Some(wish) = self.hud.wish.clone() {
            let scale = 3;
            let tw = Canvas::text_width(&wish, scale);
            let x = w.saturating_sub(tw) / 2;
            self.canvas.draw_text(&wish, x, h / 3, WISH_COLOR, scale);
        }

        let y = h - STATUS_H;
        self.canvas.fill_rect(0, y, w, STATUS_H, STATUS_BG);
        let line = format!(
            "stage: {}   camera: {}   photos: {}   {}",
            self.hud.stage,
            if self.hud.camera { "on" } else { "off" },
            self.hud.photos,
            self.hud.status,
        );
        self.canvas.draw_text(&line, 10, y + 8, TEXT_COLOR, 1);
        self.canvas.draw_text(LEGEND, 10, y + 22, LEGEND_COLOR, 1);
    }
}

fn screen_quad(corners: [Option<(f32, f32, f32)>; 4]) -> Option<[(f32, f32); 4]> {
    let mut out = [(0.0, 0.0); 4];
    for (slot, c) in out.iter_mut().zip(corners) {
        let (x, y, _) = c?;
        *slot = (x, y);
    }
    Some(out)
}

impl RenderingEngine for Visualizer {
    fn elapsed(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    fn node(&mut self, id: NodeId) -> &mut dyn SceneNode {
        self.nodes.entry(id)
    }

    fn set_camera(&mut self, pose: CameraPose) {
        self.camera = pose;
    }

    fn draw_particles(&mut self, frame: &ParticleFrame<'_>) {
        self.particles.clear();
        self.particles.extend(
            frame.positions.iter().zip(frame.colors).map(|(p, c): (&Vec3, &Color)| (*p, c.to_argb())),
        );
        self.particle_opacity = frame.opacity;
        self.particle_spin    = frame.rotation_y;
    }

    fn present(&mut self) -> tree_scene::Result<()> {
        self.canvas.clear_gradient(BG_TOP, BG_BOTTOM);
        self.draw_scene();
        self.draw_hud();
        self.window
            .update_with_buffer(&self.canvas.buf, self.canvas.width, self.canvas.height)
            .map_err(|e| SceneError::render(e.to_string()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn pose() -> CameraPose {
        CameraPose { position: Vec3::new(0.0, 0.0, 20.0), target: Vec3::ZERO }
    }

    #[test]
    fn target_projects_to_centre() {
        let p = Projector::new(pose(), 800, 600);
        let (x, y, d) = p.project(Vec3::ZERO).unwrap();
        assert!((x - 400.0).abs() < 1e-3 && (y - 300.0).abs() < 1e-3);
        assert!((d - 20.0).abs() < 1e-4);
    }

    #[test]
    fn up_is_up_and_right_is_right() {
        let p = Projector::new(pose(), 800, 600);
        let (_, y_up, _) = p.project(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        let (x_r, _, _) = p.project(Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(y_up < 300.0);
        assert!(x_r > 400.0);
    }

    #[test]
    fn behind_camera_is_culled() {
        let p = Projector::new(pose(), 800, 600);
        assert!(p.project(Vec3::new(0.0, 0.0, 25.0)).is_none());
    }

    #[test]
    fn triangle_covers_centroid_only() {
        let mut c = Canvas::new(20, 20);
        c.fill_rect(0, 0, 20, 20, 0xFF000000);
        c.fill_triangle((2.0, 2.0), (18.0, 2.0), (2.0, 18.0), 0xFFFFFFFF, 1.0);
        assert_eq!(c.pixel(5, 5), Some(0xFFFFFFFF));
        assert_eq!(c.pixel(17, 17), Some(0xFF000000));
    }

    #[test]
    fn shapes_clip_at_edges() {
        let mut c = Canvas::new(10, 10);
        c.fill_disc(-3.0, 5.0, 6.0, 0xFFFF0000, 1.0);
        c.fill_diamond(12.0, 12.0, 5.0, 0xFF00FF00, 0.5);
        c.draw_text("STAGE: NEBULA", 6, 8, 0xFFFFFFFF, 2);
        assert_eq!(c.pixel(0, 5), Some(0xFFFF0000));
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
        assert_eq!(blend(0xFF000000, 0xFF0000FF, 0.5), 0xFF000080);
    }

    #[test]
    fn glyph_fallback_is_a_dot() {
        assert_eq!(glyph('~'), 0b000_000_010_000_000);
        assert_eq!(glyph('a'), glyph('A'));
    }
}
