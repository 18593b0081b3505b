//! Scene controller: owns the layer list, dispatches pointer and wheel
//! input, and drives the render loop.
//!
//! Handlers return a vector of [`Event`]s for the host to process —
//! lifecycle hooks, cursor requests, render needs. Hooks are the only
//! notification channel: mutators never return state. All coordinate
//! correction happens here, once, before any hit-test; everything below
//! this layer works in surface coordinates.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use tracing::{debug, warn};

use crate::consts::WHEEL_SCALE_STEP;
use crate::drag::{DragCoordinator, DragTarget};
use crate::geometry::{ScaleLimits, Size, Vector};
use crate::handle::{HandleKind, Trigger};
use crate::hit::{catch_node, in_area};
use crate::layer::{self, LayerOp};
use crate::node::{NodeId, SceneNode, SceneStore};
use crate::painter::{PaintError, Painter, SurfaceId};
use crate::render;
use crate::snapshot::{self, ImportError, SceneRecord};
use crate::viewport::Viewport;

/// Pointer phase of the input state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Down,
    Move,
}

/// Named lifecycle hooks, fired synchronously after the corresponding
/// state commit and before the next render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// A node entered the scene (attach or import).
    Load,
    /// A node became the focus.
    Select,
    /// The focus was cleared by a press outside every node.
    Cancel,
    /// The pointer entered a node.
    Hover,
    /// The pointer left a node.
    Leave,
    /// A node was disabled through the mutator API.
    Hide,
    /// A node was re-enabled through the mutator API.
    Show,
    /// A disabled node was skipped by the render loop for the first time.
    Hidden,
    /// A node left the scene.
    Remove,
    /// A node's mirror flag flipped.
    Mirror,
    /// A node was locked.
    Lock,
    /// A node was unlocked.
    Unlock,
    /// A node's geometry or stacking changed through the mutator API.
    Update,
    /// Pointer released inside the focused node.
    InnerUp,
    /// Pointer released outside the focused node.
    OuterUp,
}

/// What a handler wants the host to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A lifecycle hook fired for the given node (or none, for
    /// scene-wide transitions).
    Hook { hook: Hook, node: Option<NodeId> },
    /// The host should change the pointer cursor.
    SetCursor(&'static str),
    /// The scene changed; the host should schedule a render pass.
    RenderNeeded,
}

/// The scene controller. One per editing surface.
#[derive(Debug, Default)]
pub struct Controller {
    store: SceneStore,
    drag: DragCoordinator,
    viewport: Viewport,
    focused: Option<NodeId>,
    hovered: Option<NodeId>,
    phase: Phase,
    freehand_armed: bool,
    freehand_points: Option<Vec<Vector>>,
    scale_limits: ScaleLimits,
    /// Cache surfaces orphaned by node removal or scene replacement,
    /// released at the start of the next render pass.
    retired_surfaces: Vec<SurfaceId>,
}

impl Controller {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Host wiring ---

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Override the cumulative scale bounds for gestures on this scene.
    pub fn set_scale_limits(&mut self, limits: ScaleLimits) {
        self.scale_limits = limits;
    }

    // --- Queries ---

    #[must_use]
    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.store.get(id)
    }

    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    #[must_use]
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Focus capture is permitted only when nothing is focused or the
    /// node already is, so a gesture can never steal focus mid-flight.
    #[must_use]
    pub fn can_focus(&self, id: NodeId) -> bool {
        self.focused.is_none() || self.focused == Some(id)
    }

    // --- Node lifecycle ---

    /// Bind an externally constructed node into the scene: mounts it,
    /// anchors its handles, and appends it to the layer list.
    pub fn attach(&mut self, mut node: SceneNode) -> (NodeId, Vec<Event>) {
        let id = node.id;
        node.mount();
        debug!(node = %id, layer = node.layer, "node attached");
        self.store.insert(node);
        (id, vec![Event::Hook { hook: Hook::Load, node: Some(id) }, Event::RenderNeeded])
    }

    // --- Input dispatch ---

    /// Pointer press. Focused-node handles win over everything beneath;
    /// then the layer list is scanned topmost-first.
    pub fn on_down(&mut self, raw: Vector) -> Vec<Event> {
        let pointer = self.viewport.correct(raw);
        self.phase = Phase::Down;
        let mut events = Vec::new();
        self.store.refresh_vertices();

        if let Some(id) = self.focused {
            if let Some(node) = self.store.get_mut(id) {
                node.layout_handles();
                if let Some(index) = node.hit_handle(pointer) {
                    match node.handles[index].trigger {
                        Trigger::Click => {
                            if matches!(node.handles[index].kind, HandleKind::Lock) {
                                node.locked = !node.locked;
                                let hook = if node.locked { Hook::Lock } else { Hook::Unlock };
                                events.push(Event::Hook { hook, node: Some(id) });
                            }
                        }
                        Trigger::Drag => {
                            node.handles[index].begin_gesture(&node.rect, pointer);
                            self.drag
                                .capture(DragTarget::Handle { node: id, handle: index }, pointer);
                        }
                    }
                    events.push(Event::RenderNeeded);
                    return events;
                }
            }
        }

        if let Some(hit) = catch_node(&self.store, pointer) {
            if self.focused != Some(hit) {
                events.extend(self.focus_on(hit));
            }
            let locked = self.store.get(hit).is_some_and(|node| node.locked);
            if !locked {
                self.drag.capture(DragTarget::Node(hit), pointer);
            }
            events.push(Event::RenderNeeded);
            return events;
        }

        // Missed everything: an armed freehand mode takes the stroke,
        // otherwise the focus clears.
        if self.freehand_armed {
            self.freehand_points = Some(vec![pointer]);
            return events;
        }
        if let Some(prev) = self.clear_focus() {
            events.push(Event::Hook { hook: Hook::Cancel, node: Some(prev) });
            events.push(Event::RenderNeeded);
        }
        events
    }

    /// Pointer move: feeds the active gesture, or tracks hover.
    pub fn on_move(&mut self, raw: Vector) -> Vec<Event> {
        let pointer = self.viewport.correct(raw);
        let mut events = Vec::new();

        if let Some(points) = &mut self.freehand_points {
            points.push(pointer);
            events.push(Event::RenderNeeded);
            return events;
        }

        if let Some(step) = self.drag.update(pointer) {
            self.phase = Phase::Move;
            match step.target {
                DragTarget::Node(id) => {
                    if let Some(node) = self.store.get_mut(id) {
                        node.rect.drag_by(step.delta);
                    }
                }
                DragTarget::Handle { node, handle } => {
                    if let Some(owner) = self.store.get_mut(node) {
                        if handle < owner.handles.len() {
                            owner.handles[handle].drag_effect(
                                &mut owner.rect,
                                step.pointer,
                                self.scale_limits,
                            );
                        }
                    }
                }
            }
            events.push(Event::RenderNeeded);
            return events;
        }

        self.store.refresh_vertices();
        let hit = catch_node(&self.store, pointer);
        if hit != self.hovered {
            if let Some(prev) = self.hovered {
                events.push(Event::Hook { hook: Hook::Leave, node: Some(prev) });
            }
            if let Some(entered) = hit {
                events.push(Event::Hook { hook: Hook::Hover, node: Some(entered) });
                events.push(Event::SetCursor("move"));
            } else {
                events.push(Event::SetCursor("default"));
            }
            self.hovered = hit;
        }
        events
    }

    /// Pointer release: closes the gesture, commits transient scale, and
    /// reports whether the release landed inside the focused node.
    pub fn on_up(&mut self, raw: Vector) -> Vec<Event> {
        let pointer = self.viewport.correct(raw);
        let mut events = Vec::new();

        if let Some(points) = self.freehand_points.take() {
            events.extend(self.commit_freehand(points));
        }

        let was_dragging = self.drag.is_active();
        self.drag.cancel();

        if let Some(id) = self.focused {
            if let Some(node) = self.store.get_mut(id) {
                node.rect.commit_scale();
                node.refresh_vertices();
                let hook = if in_area(&node.rect, pointer) { Hook::InnerUp } else { Hook::OuterUp };
                events.push(Event::Hook { hook, node: Some(id) });
            }
        }

        self.phase = Phase::Idle;
        if was_dragging || !events.is_empty() {
            events.push(Event::RenderNeeded);
        }
        events
    }

    /// Wheel: scale the focused node by one step per notch and commit.
    /// A zero vertical delta (pure horizontal scroll) has no direction and
    /// does nothing.
    pub fn on_wheel(&mut self, delta_y: f64) -> Vec<Event> {
        if delta_y.abs() < f64::EPSILON {
            return Vec::new();
        }
        let Some(id) = self.focused else {
            return Vec::new();
        };
        let Some(node) = self.store.get_mut(id) else {
            return Vec::new();
        };
        let factor = if delta_y < 0.0 { WHEEL_SCALE_STEP } else { 1.0 / WHEEL_SCALE_STEP };
        node.set_delta_scale(factor, self.scale_limits);
        node.rect.commit_scale();
        vec![Event::Hook { hook: Hook::Update, node: Some(id) }, Event::RenderNeeded]
    }

    // --- Multi-touch adapters ---

    /// Press with a touch batch: the first contact drives the gesture.
    pub fn on_touch_down(&mut self, raw_points: &[Vector]) -> Vec<Event> {
        match Viewport::primary(raw_points) {
            Some(raw) => self.on_down(raw),
            None => Vec::new(),
        }
    }

    /// Move with a touch batch.
    pub fn on_touch_move(&mut self, raw_points: &[Vector]) -> Vec<Event> {
        match Viewport::primary(raw_points) {
            Some(raw) => self.on_move(raw),
            None => Vec::new(),
        }
    }

    /// Release with a touch batch.
    pub fn on_touch_up(&mut self, raw_points: &[Vector]) -> Vec<Event> {
        match Viewport::primary(raw_points) {
            Some(raw) => self.on_up(raw),
            None => Vec::new(),
        }
    }

    // --- Render loop ---

    /// Draw the scene: layers ascending, skipping disabled nodes (with a
    /// one-time hidden notification on the transition), the in-progress
    /// freehand trail, then the focused node's selection overlay last so
    /// handles are never occluded.
    ///
    /// # Errors
    ///
    /// Propagates painter failures; the scene state is still consistent.
    pub fn render(&mut self, painter: &mut impl Painter) -> Result<Vec<Event>, PaintError> {
        for surface in self.retired_surfaces.drain(..) {
            painter.release_surface(surface);
        }

        painter.save()?;
        match self.render_scene(painter) {
            Ok(events) => {
                painter.restore()?;
                Ok(events)
            }
            Err(err) => {
                // A failed frame must still pop the state it pushed, or the
                // backend's stack drifts across frames.
                if let Err(restore_err) = painter.restore() {
                    warn!(%restore_err, "restore failed after a paint error");
                }
                Err(err)
            }
        }
    }

    fn render_scene(&mut self, painter: &mut impl Painter) -> Result<Vec<Event>, PaintError> {
        let mut events = Vec::new();

        painter.scale(self.viewport.dpr, self.viewport.dpr)?;
        painter.clear(Size::new(self.viewport.width, self.viewport.height))?;

        for node in self.store.iter_mut() {
            if node.disabled {
                if node.was_visible {
                    node.was_visible = false;
                    events.push(Event::Hook { hook: Hook::Hidden, node: Some(node.id) });
                }
                continue;
            }
            node.was_visible = true;
            render::draw_node(painter, node)?;
        }

        if let Some(points) = &self.freehand_points {
            draw_trail(painter, points)?;
        }

        if let Some(id) = self.focused {
            if let Some(node) = self.store.get_mut(id) {
                if !node.disabled {
                    render::draw_selection(painter, node)?;
                }
            }
        }

        Ok(events)
    }

    // --- Mutators ---
    //
    // Each resolves an explicit-or-focused target, applies the change,
    // fires its hook, and requests a render. A missing target is a silent
    // no-op: UI-driven calls must tolerate "nothing selected".

    /// Focus a node (explicit id, or re-assert the current focus).
    pub fn select(&mut self, target: Option<NodeId>) -> Vec<Event> {
        let Some(id) = self.resolve(target) else {
            return Vec::new();
        };
        if self.focused == Some(id) {
            return Vec::new();
        }
        // Focus moves freely while idle; mid-gesture it must not be stolen.
        if self.phase != Phase::Idle && !self.can_focus(id) {
            return Vec::new();
        }
        if self.store.get(id).is_none_or(|node| node.background) {
            return Vec::new();
        }
        let mut events = self.focus_on(id);
        events.push(Event::RenderNeeded);
        events
    }

    pub fn lock(&mut self, target: Option<NodeId>) -> Vec<Event> {
        self.flag_mutation(target, Hook::Lock, |node| node.locked = true)
    }

    pub fn unlock(&mut self, target: Option<NodeId>) -> Vec<Event> {
        self.flag_mutation(target, Hook::Unlock, |node| node.locked = false)
    }

    pub fn mirror(&mut self, target: Option<NodeId>) -> Vec<Event> {
        self.flag_mutation(target, Hook::Mirror, |node| node.mirrored = !node.mirrored)
    }

    pub fn hide(&mut self, target: Option<NodeId>) -> Vec<Event> {
        self.flag_mutation(target, Hook::Hide, |node| node.disabled = true)
    }

    pub fn show(&mut self, target: Option<NodeId>) -> Vec<Event> {
        self.flag_mutation(target, Hook::Show, |node| {
            node.disabled = false;
            node.was_visible = true;
        })
    }

    /// Remove a node from the scene entirely.
    pub fn remove(&mut self, target: Option<NodeId>) -> Vec<Event> {
        let Some(id) = self.resolve(target) else {
            return Vec::new();
        };
        let Some(mut node) = self.store.remove(id) else {
            return Vec::new();
        };
        node.unmount();
        if let Some(surface) = node.take_cache_surface() {
            self.retired_surfaces.push(surface);
        }
        if self.focused == Some(id) {
            self.focused = None;
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        if self.drag.target().is_some_and(|target| target_node(target) == id) {
            self.drag.cancel();
        }
        debug!(node = %id, "node removed");
        vec![Event::Hook { hook: Hook::Remove, node: Some(id) }, Event::RenderNeeded]
    }

    /// Restack a node.
    pub fn set_layer(&mut self, target: Option<NodeId>, op: LayerOp) -> Vec<Event> {
        let Some(id) = self.resolve(target) else {
            return Vec::new();
        };
        if !layer::apply(&mut self.store, id, op) {
            return Vec::new();
        }
        vec![Event::Hook { hook: Hook::Update, node: Some(id) }, Event::RenderNeeded]
    }

    /// Set a node's rotation directly, in radians.
    pub fn rotate_to(&mut self, target: Option<NodeId>, angle: f64) -> Vec<Event> {
        self.geometry_mutation(target, |node| node.rect.set_angle(angle))
    }

    /// Translate a node by a surface-space delta.
    pub fn translate_by(&mut self, target: Option<NodeId>, delta: Vector) -> Vec<Event> {
        self.geometry_mutation(target, |node| node.rect.add_position(delta))
    }

    // --- Freehand draw mode ---

    /// Arm freehand drawing: the next press outside any node starts a
    /// stroke instead of clearing the focus.
    pub fn arm_freehand(&mut self) {
        self.freehand_armed = true;
    }

    pub fn disarm_freehand(&mut self) {
        self.freehand_armed = false;
        self.freehand_points = None;
    }

    #[must_use]
    pub fn freehand_armed(&self) -> bool {
        self.freehand_armed
    }

    // --- History (reserved) ---

    /// Reserved undo surface. History capture is a separate subsystem and
    /// not implemented; this is a no-op so hosts can wire menus early.
    pub fn undo(&mut self) -> Vec<Event> {
        Vec::new()
    }

    /// Reserved redo surface; see [`Controller::undo`].
    pub fn redo(&mut self) -> Vec<Event> {
        Vec::new()
    }

    // --- Export / import ---

    /// Export every node, back-to-front.
    #[must_use]
    pub fn export(&self) -> SceneRecord {
        snapshot::export_scene(&self.store)
    }

    /// Export the scene as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Malformed`] if serialization fails.
    pub fn export_json(&self) -> Result<String, ImportError> {
        Ok(serde_json::to_string(&self.export())?)
    }

    /// Replace the scene from a JSON payload, all-or-nothing: on any
    /// error the current scene is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] for empty, malformed, or unknown-decoration
    /// payloads.
    pub fn import_json(&mut self, payload: &str) -> Result<Vec<Event>, ImportError> {
        let nodes = match snapshot::parse_scene(payload, self.scale_limits) {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!(%err, "scene import rejected");
                return Err(err);
            }
        };
        for node in self.store.iter_mut() {
            if let Some(surface) = node.take_cache_surface() {
                self.retired_surfaces.push(surface);
            }
        }
        self.store = SceneStore::new();
        self.focused = None;
        self.hovered = None;
        self.drag.cancel();
        for mut node in nodes {
            node.mount();
            self.store.insert(node);
        }
        debug!(nodes = self.store.len(), "scene imported");
        Ok(vec![Event::Hook { hook: Hook::Load, node: None }, Event::RenderNeeded])
    }

    // --- Internals ---

    fn resolve(&self, explicit: Option<NodeId>) -> Option<NodeId> {
        explicit.or(self.focused).filter(|id| self.store.get(*id).is_some())
    }

    /// Deselect the prior focus and select `id`. Fires the select hook.
    fn focus_on(&mut self, id: NodeId) -> Vec<Event> {
        if let Some(prev) = self.focused {
            if let Some(node) = self.store.get_mut(prev) {
                node.selected = false;
            }
        }
        if let Some(node) = self.store.get_mut(id) {
            node.selected = true;
        }
        self.focused = Some(id);
        debug!(node = %id, "node focused");
        vec![Event::Hook { hook: Hook::Select, node: Some(id) }]
    }

    fn clear_focus(&mut self) -> Option<NodeId> {
        let prev = self.focused.take()?;
        if let Some(node) = self.store.get_mut(prev) {
            node.selected = false;
        }
        Some(prev)
    }

    fn flag_mutation(
        &mut self,
        target: Option<NodeId>,
        hook: Hook,
        apply: impl FnOnce(&mut SceneNode),
    ) -> Vec<Event> {
        let Some(id) = self.resolve(target) else {
            return Vec::new();
        };
        let Some(node) = self.store.get_mut(id) else {
            return Vec::new();
        };
        apply(node);
        vec![Event::Hook { hook, node: Some(id) }, Event::RenderNeeded]
    }

    fn geometry_mutation(
        &mut self,
        target: Option<NodeId>,
        apply: impl FnOnce(&mut SceneNode),
    ) -> Vec<Event> {
        self.flag_mutation(target, Hook::Update, apply)
    }

    /// Turn a captured point trail into a freehand node on top of the
    /// stack.
    fn commit_freehand(&mut self, points: Vec<Vector>) -> Vec<Event> {
        if points.len() < 2 {
            return Vec::new();
        }
        let center = trail_center(&points);
        let relative: Vec<Vector> = points.into_iter().map(|point| point - center).collect();
        let mut node = SceneNode::new(
            crate::node::NodeKind::Freehand { points: relative },
            center,
            Size::new(1.0, 1.0),
        );
        node.layer = self.store.max_layer().map_or(0, |max| max + 1);
        let (_, events) = self.attach(node);
        events
    }
}

/// The node a drag target belongs to.
fn target_node(target: DragTarget) -> NodeId {
    match target {
        DragTarget::Node(id) | DragTarget::Handle { node: id, .. } => id,
    }
}

/// Bounding-box center of a point trail.
fn trail_center(points: &[Vector]) -> Vector {
    let mut min = points[0];
    let mut max = points[0];
    for point in points {
        min.x = min.x.min(point.x);
        min.y = min.y.min(point.y);
        max.x = max.x.max(point.x);
        max.y = max.y.max(point.y);
    }
    Vector::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0)
}

/// Stroke the in-progress freehand trail, in surface coordinates.
fn draw_trail(painter: &mut impl Painter, points: &[Vector]) -> Result<(), PaintError> {
    let Some(first) = points.first() else {
        return Ok(());
    };
    painter.begin_path()?;
    painter.move_to(*first)?;
    for point in &points[1..] {
        painter.line_to(*point)?;
    }
    painter.set_stroke("#1F1A17", 1.0)?;
    painter.stroke()?;
    Ok(())
}
