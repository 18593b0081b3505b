//! Layer ordering: recomputes z-order keys for rise/lower/top/bottom.
//!
//! Keys are never normalized — repeated operations may leave sparse
//! integers, which is fine since only relative order is meaningful. After
//! every mutation the store re-sorts stably, so a risen node lands above
//! the neighbor whose key it passed even when the keys tie.

#[cfg(test)]
#[path = "layer_test.rs"]
mod layer_test;

use crate::node::{NodeId, SceneStore};

/// Requested stacking change for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerOp {
    /// One step toward the front: next-higher neighbor's key + 1.
    Rise,
    /// One step toward the back: next-lower neighbor's key − 1.
    Lower,
    /// Above everything: max key + 1.
    Top,
    /// Beneath everything: min key − 1.
    Bottom,
    /// No key change; re-sort only.
    None,
}

/// Apply `op` to the node with `id`. Returns `false` when the node is not
/// in the store.
pub fn apply(store: &mut SceneStore, id: NodeId, op: LayerOp) -> bool {
    let Some(index) = store.index_of(id) else {
        return false;
    };

    let new_key = match op {
        LayerOp::Rise => store.nodes().get(index + 1).map(|above| above.layer + 1),
        LayerOp::Lower => index
            .checked_sub(1)
            .and_then(|below| store.nodes().get(below))
            .map(|below| below.layer - 1),
        LayerOp::Top => store.max_layer().map(|max| max + 1),
        LayerOp::Bottom => store.min_layer().map(|min| min - 1),
        LayerOp::None => None,
    };

    if let Some(key) = new_key {
        store.node_at_mut(index).layer = key;
    }
    store.resort();
    true
}
