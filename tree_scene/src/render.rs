//! The typed scene-graph interface the animator drives each frame.
//!
//! A backend implements [`RenderingEngine`]; every addressable object in the
//! scene is a [`SceneNode`] looked up by [`NodeId`].  [`HeadlessEngine`]
//! records the last values pushed to each node and is what the tests and
//! the `--headless` app mode use.

use std::collections::HashMap;

use crate::error::Result;
use crate::math::{Color, Transform, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    /// Parent of every tree item; carries the height tween, sway and float.
    Group,
    Photo(usize),
    Ornament(usize),
    Topper,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub opacity:  f32,
    pub emissive: f32,
    pub color:    Color,
}

impl Default for Material {
    fn default() -> Self {
        Material { opacity: 1.0, emissive: 0.0, color: Color::WHITE }
    }
}

pub trait SceneNode {
    /// Transform relative to the node's parent (items are children of
    /// [`NodeId::Group`]).
    fn set_transform(&mut self, transform: Transform);
    fn set_material(&mut self, material: Material);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target:   Vec3,
}

/// The particle cloud in one call, positions in group space.
#[derive(Clone, Copy, Debug)]
pub struct ParticleFrame<'a> {
    pub positions:  &'a [Vec3],
    pub colors:     &'a [Color],
    pub opacity:    f32,
    /// Spin of the whole cloud around the group's Y axis.
    pub rotation_y: f32,
}

pub trait RenderingEngine {
    /// Seconds since the engine started.
    fn elapsed(&self) -> f32;
    fn node(&mut self, id: NodeId) -> &mut dyn SceneNode;
    fn set_camera(&mut self, pose: CameraPose);
    fn draw_particles(&mut self, frame: &ParticleFrame<'_>);
    /// Finish the frame.
    fn present(&mut self) -> Result<()>;
}

// ════════════════════════════════════════════════════════════════════════════
// NodeState — plain recorded node
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeState {
    pub transform: Transform,
    pub material:  Material,
}

impl SceneNode for NodeState {
    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn set_material(&mut self, material: Material) {
        self.material = material;
    }
}

/// Node table shared by backends that keep their own per-node state.
#[derive(Clone, Debug, Default)]
pub struct NodeTable {
    nodes: HashMap<NodeId, NodeState>,
}

impl NodeTable {
    pub fn entry(&mut self, id: NodeId) -> &mut NodeState {
        self.nodes.entry(id).or_default()
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeState> {
        self.nodes.get(&id)
    }

    /// Nodes in a stable order (group, photos, ornaments, topper).
    pub fn sorted(&self) -> Vec<(NodeId, NodeState)> {
        let mut all: Vec<_> = self.nodes.iter().map(|(k, v)| (*k, *v)).collect();
        all.sort_by_key(|(id, _)| *id);
        all
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HeadlessEngine
// ════════════════════════════════════════════════════════════════════════════

/// Records what would be drawn; the clock is advanced by hand.
#[derive(Debug, Default)]
pub struct HeadlessEngine {
    pub clock:            f32,
    pub nodes:            NodeTable,
    pub camera:           Option<CameraPose>,
    pub particle_count:   usize,
    pub particle_opacity: f32,
    pub particle_spin:    f32,
    pub frames:           u64,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt: f32) {
        self.clock += dt;
    }
}

impl RenderingEngine for HeadlessEngine {
    fn elapsed(&self) -> f32 {
        self.clock
    }

    fn node(&mut self, id: NodeId) -> &mut dyn SceneNode {
        self.nodes.entry(id)
    }

    fn set_camera(&mut self, pose: CameraPose) {
        self.camera = Some(pose);
    }

    fn draw_particles(&mut self, frame: &ParticleFrame<'_>) {
        self.particle_count   = frame.positions.len();
        self.particle_opacity = frame.opacity;
        self.particle_spin    = frame.rotation_y;
    }

    fn present(&mut self) -> Result<()> {
        self.frames += 1;
        Ok(())
    }
}
