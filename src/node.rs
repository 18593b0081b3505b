//! Scene nodes: the manipulable entities on the editing surface, and the
//! ordered store that owns them.
//!
//! A node is geometry (via [`Rect`]) plus flags, styling, an optional
//! decoration, and its attached handle set. Node variants are discriminated
//! by [`NodeKind`] — a kind tag, not a type hierarchy — so dispatch in the
//! renderer and controller is a `match`, never a virtual chain. The store
//! keeps nodes sorted ascending by layer key (back-to-front); re-sorting is
//! stable, so equal keys preserve their relative order.

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::geometry::{Rect, ScaleLimits, Size, Vector};
use crate::handle::{Alignment, Handle, HandleKind};
use crate::hit::in_circle;
use crate::painter::SurfaceId;
use crate::transform::{CacheInvalidator, DirtyFlag, FixedSizeTracker};

/// Unique identifier for a scene node.
pub type NodeId = Uuid;

/// Shape variants drawn from the node's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Axis-aligned rectangle (before node rotation).
    Rect,
    /// Ellipse inscribed within the bounding box.
    Ellipse,
    /// Diamond with vertices at bounding-box edge midpoints.
    Diamond,
    /// Five-point star inscribed within the bounding box.
    Star,
}

/// Opaque reference to a decoded image owned by the host. The painter
/// backend resolves it; the core never touches pixel data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef(pub String);

/// The kind of a scene node. Discriminates dispatch without relying on
/// type identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum NodeKind {
    /// Bitmap content blitted from a host-owned image.
    Image { source: ImageRef },
    /// Single-run text; layout and line breaking are the host's concern.
    Text { content: String },
    /// Vector shape filled and stroked from the node style.
    Shape { shape: ShapeKind },
    /// Clipping region drawn as a translucent veil.
    Mask,
    /// Point trail captured by the freehand draw mode, in coordinates
    /// relative to the node center.
    Freehand { points: Vec<Vector> },
}

/// Fill/stroke/text styling carried on the node and exported with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    /// Explicit font size for text content; derived from height when absent.
    pub font_size: Option<f64>,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            fill: "#D94B4B".to_owned(),
            stroke: "#1F1A17".to_owned(),
            stroke_width: 1.0,
            font_size: None,
        }
    }
}

/// Requested decoration kind does not exist. This is a configuration
/// error, not a runtime input condition, so it is rejected immediately.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized decoration kind: {0:?}")]
pub struct UnknownDecoration(pub String);

/// Decoration variants a node may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecorationKind {
    /// Solid border drawn around the node bounds.
    Frame,
    /// Offset silhouette drawn beneath the node.
    Shadow,
}

impl DecorationKind {
    /// Parse a decoration kind from its wire name.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownDecoration`] for any name that is not a known kind.
    pub fn parse(name: &str) -> Result<Self, UnknownDecoration> {
        match name {
            "frame" => Ok(Self::Frame),
            "shadow" => Ok(Self::Shadow),
            other => Err(UnknownDecoration(other.to_owned())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Frame => "frame",
            Self::Shadow => "shadow",
        }
    }
}

/// A decoration attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub kind: DecorationKind,
    pub color: String,
    pub width: f64,
}

impl Decoration {
    #[must_use]
    pub fn new(kind: DecorationKind) -> Self {
        Self { kind, color: "#1F1A17".to_owned(), width: 2.0 }
    }
}

/// Render-cache state for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum CacheSlot {
    /// Caching requested but no surface acquired yet.
    #[default]
    Empty,
    /// Surface acquired; content is blitted from it.
    Ready(SurfaceId),
    /// Surface acquired but its content is outdated; the next draw must
    /// release it and repopulate.
    Stale(SurfaceId),
    /// Surface acquisition failed; this node draws live from now on.
    Off,
}

/// A manipulable entity on the editing surface.
#[derive(Debug)]
pub struct SceneNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub rect: Rect,
    /// Sort key in back-to-front stacking order. Unique in relative order
    /// but allowed to be sparse.
    pub layer: i64,
    pub selected: bool,
    pub locked: bool,
    /// Background nodes are never focal and never hit.
    pub background: bool,
    pub mirrored: bool,
    pub disabled: bool,
    pub opacity: f64,
    pub style: NodeStyle,
    pub decoration: Option<Decoration>,
    pub handles: Vec<Handle>,
    /// Whether this node wants an offscreen render cache.
    pub cache_enabled: bool,
    pub(crate) cache: CacheSlot,
    pub(crate) was_visible: bool,
    mounted: bool,
    dirty: Rc<Cell<bool>>,
    fixed_size: Rc<Cell<Size>>,
    cache_stale: Rc<Cell<bool>>,
}

impl SceneNode {
    /// Construct an unmounted node with the default handle set. Call
    /// `Controller::attach` to bind it into a scene.
    #[must_use]
    pub fn new(kind: NodeKind, position: Vector, size: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            rect: Rect::new(position, size),
            layer: 0,
            selected: false,
            locked: false,
            background: false,
            mirrored: false,
            disabled: false,
            opacity: 1.0,
            style: NodeStyle::default(),
            decoration: None,
            handles: default_handles(),
            cache_enabled: false,
            cache: CacheSlot::default(),
            was_visible: true,
            mounted: false,
            dirty: Rc::new(Cell::new(false)),
            fixed_size: Rc::new(Cell::new(size)),
            cache_stale: Rc::new(Cell::new(false)),
        }
    }

    /// Bind this node into a scene: kind readiness, transform observation,
    /// initial vertex polygon, fixed-size snapshot, handle anchoring.
    pub(crate) fn mount(&mut self) {
        self.prepare();
        self.fixed_size.set(self.rect.size());
        self.rect.observe(Box::new(DirtyFlag::new(Rc::clone(&self.dirty))));
        self.rect
            .observe(Box::new(FixedSizeTracker::new(Rc::clone(&self.fixed_size))));
        self.rect
            .observe(Box::new(CacheInvalidator::new(Rc::clone(&self.cache_stale))));
        self.rect.update_vertices();
        self.dirty.set(false);
        self.cache_stale.set(false);
        for handle in &mut self.handles {
            handle.anchor(&self.rect);
        }
        self.was_visible = !self.disabled;
        self.mounted = true;
    }

    pub(crate) fn unmount(&mut self) {
        self.mounted = false;
    }

    #[must_use]
    pub fn mounted(&self) -> bool {
        self.mounted
    }

    /// Kind-specific readiness, run once at mount.
    fn prepare(&mut self) {
        if let NodeKind::Freehand { points } = &self.kind {
            if let Some(bounds) = freehand_bounds(points) {
                self.rect.set_size(bounds);
            }
        }
    }

    /// Base (pre-scale) size snapshot, kept current across size mutations.
    #[must_use]
    pub fn fixed_size(&self) -> Size {
        self.fixed_size.get()
    }

    /// Multiply the transient scale, clamped into `limits`.
    pub fn set_delta_scale(&mut self, delta: f64, limits: ScaleLimits) {
        self.rect.set_delta_scale(delta, limits);
    }

    /// Whether geometry changed since the vertex polygon was last rebuilt.
    #[must_use]
    pub fn geometry_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Rebuild the vertex polygon if geometry changed since the last call.
    pub fn refresh_vertices(&mut self) {
        if self.dirty.get() {
            self.rect.update_vertices();
            self.dirty.set(false);
        }
    }

    /// Mark the render cache outdated. Size mutations do this through the
    /// transform observer; hosts call it after editing content or style
    /// directly.
    pub fn invalidate_cache(&mut self) {
        if let CacheSlot::Ready(id) = self.cache {
            self.cache = CacheSlot::Stale(id);
        }
    }

    /// Fold the invalidation flag set by size mutations into the cache
    /// state. Runs once per draw, before the cache is consulted.
    pub(crate) fn sync_cache(&mut self) {
        if self.cache_stale.replace(false) {
            self.invalidate_cache();
        }
    }

    /// Detach the cache surface, if one was ever acquired, handing it back
    /// for release. A disabled cache stays disabled.
    pub(crate) fn take_cache_surface(&mut self) -> Option<SurfaceId> {
        match self.cache {
            CacheSlot::Ready(id) | CacheSlot::Stale(id) => {
                self.cache = CacheSlot::Empty;
                Some(id)
            }
            CacheSlot::Empty | CacheSlot::Off => None,
        }
    }

    /// Reposition every handle against the current rect.
    pub fn layout_handles(&mut self) {
        for handle in &mut self.handles {
            handle.update_position(&self.rect);
        }
    }

    /// Index of the topmost visible handle under `pointer`, if any.
    /// Handle positions must be current (see [`SceneNode::layout_handles`]).
    #[must_use]
    pub fn hit_handle(&self, pointer: Vector) -> Option<usize> {
        self.handles
            .iter()
            .enumerate()
            .rev()
            .find(|(_, handle)| {
                handle.visible(self.locked) && in_circle(handle.world(), pointer, handle.radius)
            })
            .map(|(index, _)| index)
    }
}

/// Default satellite set: rotate above, scale-and-rotate at the corner, a
/// directional edge resize, and a lock toggle.
fn default_handles() -> Vec<Handle> {
    vec![
        Handle::new(HandleKind::Rotate, Alignment::N),
        Handle::new(HandleKind::Move { rotates: true }, Alignment::Se),
        Handle::new(HandleKind::Resize(Alignment::E), Alignment::E),
        Handle::new(HandleKind::Lock, Alignment::Nw),
    ]
}

/// Bounding-box size of a freehand point trail.
fn freehand_bounds(points: &[Vector]) -> Option<Size> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for point in points {
        min.x = min.x.min(point.x);
        min.y = min.y.min(point.y);
        max.x = max.x.max(point.x);
        max.y = max.y.max(point.y);
    }
    Some(Size::new((max.x - min.x).max(1.0), (max.y - min.y).max(1.0)))
}

/// Ordered owner of all live nodes, ascending by layer key.
#[derive(Debug, Default)]
pub struct SceneStore {
    nodes: Vec<SceneNode>,
}

impl SceneStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node and restore ascending layer order. Equal keys keep
    /// the newcomer on top.
    pub fn insert(&mut self, node: SceneNode) {
        self.nodes.push(node);
        self.resort();
    }

    /// Remove a node by id, returning it if present.
    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        let index = self.index_of(id)?;
        Some(self.nodes.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    /// Back-to-front iteration (ascending layer key).
    pub fn iter(&self) -> std::slice::Iter<'_, SceneNode> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, SceneNode> {
        self.nodes.iter_mut()
    }

    /// Front-to-back iteration, for topmost-wins scans.
    pub fn iter_top_down(&self) -> std::iter::Rev<std::slice::Iter<'_, SceneNode>> {
        self.nodes.iter().rev()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Stable ascending re-sort by layer key. Keys are not normalized;
    /// sparse values are acceptable since only relative order matters.
    pub fn resort(&mut self) {
        self.nodes.sort_by_key(|node| node.layer);
    }

    /// Rebuild stale vertex polygons across the scene.
    pub fn refresh_vertices(&mut self) {
        for node in &mut self.nodes {
            node.refresh_vertices();
        }
    }

    #[must_use]
    pub fn max_layer(&self) -> Option<i64> {
        self.nodes.iter().map(|node| node.layer).max()
    }

    #[must_use]
    pub fn min_layer(&self) -> Option<i64> {
        self.nodes.iter().map(|node| node.layer).min()
    }

    pub(crate) fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|node| node.id == id)
    }

    pub(crate) fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub(crate) fn node_at_mut(&mut self, index: usize) -> &mut SceneNode {
        &mut self.nodes[index]
    }
}
