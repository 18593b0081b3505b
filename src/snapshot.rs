//! Export/import records: the field contract a host serializer consumes.
//!
//! The core guarantees field completeness and round-trip of these records;
//! wire-schema versioning is the host's concern. Import is all-or-nothing:
//! every record must convert cleanly before anything is applied, so a
//! malformed payload can never leave a scene half-imported.

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{ScaleLimits, Size, Vector};
use crate::handle::{Alignment, Handle, HandleId, HandleKind, HandleStyle};
use crate::node::{
    Decoration, DecorationKind, NodeId, NodeKind, NodeStyle, SceneNode, SceneStore,
    UnknownDecoration,
};

/// Import payload was rejected; nothing was applied.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The payload was empty or whitespace.
    #[error("empty import payload")]
    EmptyPayload,
    /// The payload was not valid JSON for the scene schema.
    #[error("malformed import payload: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A record named a decoration kind that does not exist.
    #[error(transparent)]
    UnknownDecoration(#[from] UnknownDecoration),
}

/// Serialized form of one handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandleRecord {
    pub id: HandleId,
    pub kind: HandleKind,
    pub alignment: Alignment,
    pub radius: f64,
    pub free: bool,
    pub enabled: bool,
    pub style: HandleStyle,
}

impl HandleRecord {
    #[must_use]
    pub fn from_handle(handle: &Handle) -> Self {
        Self {
            id: handle.id,
            kind: handle.kind,
            alignment: handle.alignment,
            radius: handle.radius,
            free: handle.free,
            enabled: handle.enabled,
            style: handle.style.clone(),
        }
    }

    /// Rebuild a handle. The trigger is derived from the kind, as at
    /// construction.
    #[must_use]
    pub fn into_handle(self) -> Handle {
        let mut handle = Handle::new(self.kind, self.alignment);
        handle.id = self.id;
        handle.radius = self.radius;
        handle.free = self.free;
        handle.enabled = self.enabled;
        handle.style = self.style;
        handle
    }
}

/// Serialized form of a decoration. The kind travels by name so hosts can
/// emit records without linking against the enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecorationRecord {
    pub kind: String,
    pub color: String,
    pub width: f64,
}

impl DecorationRecord {
    #[must_use]
    pub fn from_decoration(decoration: &Decoration) -> Self {
        Self {
            kind: decoration.kind.as_str().to_owned(),
            color: decoration.color.clone(),
            width: decoration.width,
        }
    }

    /// # Errors
    ///
    /// Returns [`UnknownDecoration`] when the kind name is not recognized.
    pub fn into_decoration(self) -> Result<Decoration, UnknownDecoration> {
        Ok(Decoration {
            kind: DecorationKind::parse(&self.kind)?,
            color: self.color,
            width: self.width,
        })
    }
}

/// Serialized form of one scene node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub kind: NodeKind,
    pub position: Vector,
    pub size: Size,
    pub angle: f64,
    /// Committed scale only; transient gesture scale is never persisted.
    pub scale: f64,
    pub mirrored: bool,
    pub locked: bool,
    pub background: bool,
    pub opacity: f64,
    pub layer: i64,
    pub style: NodeStyle,
    pub decoration: Option<DecorationRecord>,
    pub handles: Vec<HandleRecord>,
}

impl NodeRecord {
    #[must_use]
    pub fn from_node(node: &SceneNode) -> Self {
        Self {
            id: node.id,
            kind: node.kind.clone(),
            position: node.rect.position(),
            size: node.rect.size(),
            angle: node.rect.angle(),
            scale: node.rect.scale(),
            mirrored: node.mirrored,
            locked: node.locked,
            background: node.background,
            opacity: node.opacity,
            layer: node.layer,
            style: node.style.clone(),
            decoration: node.decoration.as_ref().map(DecorationRecord::from_decoration),
            handles: node.handles.iter().map(HandleRecord::from_handle).collect(),
        }
    }

    /// Rebuild an unmounted node from this record. `limits` must be the
    /// scale bounds the scene runs under, or a scale persisted beyond the
    /// defaults would silently re-import clamped.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::UnknownDecoration`] when the decoration kind
    /// is not recognized.
    pub fn into_node(self, limits: ScaleLimits) -> Result<SceneNode, ImportError> {
        let mut node = SceneNode::new(self.kind, self.position, self.size);
        node.id = self.id;
        node.rect.set_angle(self.angle);
        if (self.scale - 1.0).abs() > f64::EPSILON {
            // Committed scale restores through the same clamped channel as
            // live gestures, then folds immediately.
            node.rect.set_delta_scale(self.scale, limits);
            node.rect.commit_scale();
        }
        node.mirrored = self.mirrored;
        node.locked = self.locked;
        node.background = self.background;
        node.opacity = self.opacity;
        node.layer = self.layer;
        node.style = self.style;
        node.decoration = match self.decoration {
            Some(record) => Some(record.into_decoration()?),
            None => None,
        };
        node.handles = self.handles.into_iter().map(HandleRecord::into_handle).collect();
        Ok(node)
    }
}

/// Serialized form of a whole scene, back-to-front.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneRecord {
    pub nodes: Vec<NodeRecord>,
}

/// Export every node in the store, back-to-front.
#[must_use]
pub fn export_scene(store: &SceneStore) -> SceneRecord {
    SceneRecord { nodes: store.iter().map(NodeRecord::from_node).collect() }
}

/// Parse a JSON scene payload into unmounted nodes, all-or-nothing.
/// Committed scales are clamped into `limits` on the way in.
///
/// # Errors
///
/// Returns [`ImportError`] when the payload is empty, malformed, or names
/// an unknown decoration kind. No nodes are returned on any failure.
pub fn parse_scene(payload: &str, limits: ScaleLimits) -> Result<Vec<SceneNode>, ImportError> {
    if payload.trim().is_empty() {
        return Err(ImportError::EmptyPayload);
    }
    let record: SceneRecord = serde_json::from_str(payload)?;
    record.nodes.into_iter().map(|node| node.into_node(limits)).collect()
}
