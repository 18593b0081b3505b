#![allow(clippy::float_cmp)]

use super::*;

fn shape(x: f64, y: f64, w: f64, h: f64) -> SceneNode {
    SceneNode::new(NodeKind::Shape { shape: ShapeKind::Rect }, Vector::new(x, y), Size::new(w, h))
}

fn mounted_shape(x: f64, y: f64, w: f64, h: f64) -> SceneNode {
    let mut node = shape(x, y, w, h);
    node.mount();
    node
}

// =============================================================
// Decoration parsing
// =============================================================

#[test]
fn decoration_kind_parses_known_names() {
    assert_eq!(DecorationKind::parse("frame"), Ok(DecorationKind::Frame));
    assert_eq!(DecorationKind::parse("shadow"), Ok(DecorationKind::Shadow));
}

#[test]
fn decoration_kind_rejects_unknown_names() {
    let err = DecorationKind::parse("glow").unwrap_err();
    assert_eq!(err, UnknownDecoration("glow".to_owned()));
    assert!(DecorationKind::parse("").is_err());
    // Names are case-sensitive wire identifiers.
    assert!(DecorationKind::parse("Frame").is_err());
}

#[test]
fn decoration_kind_round_trips_through_as_str() {
    for kind in [DecorationKind::Frame, DecorationKind::Shadow] {
        assert_eq!(DecorationKind::parse(kind.as_str()), Ok(kind));
    }
}

// =============================================================
// Mount lifecycle
// =============================================================

#[test]
fn new_node_is_unmounted() {
    let node = shape(0.0, 0.0, 4.0, 4.0);
    assert!(!node.mounted());
}

#[test]
fn mount_builds_the_vertex_polygon() {
    let node = mounted_shape(10.0, 10.0, 4.0, 4.0);
    assert!(node.mounted());
    assert_eq!(node.rect.vertices()[0], Vector::new(8.0, 8.0));
    assert!(!node.geometry_dirty());
}

#[test]
fn mount_anchors_the_default_handles() {
    let node = mounted_shape(0.0, 0.0, 10.0, 10.0);
    assert_eq!(node.handles.len(), 4);
    // The corner move handle lands on the south-east vertex.
    let corner = node
        .handles
        .iter()
        .find(|handle| matches!(handle.kind, HandleKind::Move { .. }))
        .unwrap();
    assert_eq!(corner.world(), Vector::new(5.0, 5.0));
}

#[test]
fn unmount_clears_the_mounted_flag() {
    let mut node = mounted_shape(0.0, 0.0, 4.0, 4.0);
    node.unmount();
    assert!(!node.mounted());
}

#[test]
fn mount_fits_a_freehand_node_to_its_trail() {
    let points = vec![
        Vector::new(-3.0, -1.0),
        Vector::new(0.0, 2.0),
        Vector::new(5.0, 1.0),
    ];
    let mut node = SceneNode::new(
        NodeKind::Freehand { points },
        Vector::new(10.0, 10.0),
        Size::new(1.0, 1.0),
    );
    node.mount();
    assert_eq!(node.rect.size(), Size::new(8.0, 3.0));
    assert_eq!(node.fixed_size(), Size::new(8.0, 3.0));
}

// =============================================================
// Dirty tracking
// =============================================================

#[test]
fn mutation_marks_geometry_dirty() {
    let mut node = mounted_shape(0.0, 0.0, 4.0, 4.0);
    node.rect.set_position(Vector::new(1.0, 1.0));
    assert!(node.geometry_dirty());
}

#[test]
fn refresh_vertices_rebuilds_once_and_clears_the_flag() {
    let mut node = mounted_shape(0.0, 0.0, 4.0, 4.0);
    node.rect.set_position(Vector::new(10.0, 0.0));
    node.refresh_vertices();
    assert!(!node.geometry_dirty());
    assert_eq!(node.rect.vertices()[0], Vector::new(8.0, -2.0));
}

#[test]
fn fixed_size_survives_scaling_but_tracks_resizes() {
    let mut node = mounted_shape(0.0, 0.0, 6.0, 4.0);
    node.set_delta_scale(3.0, ScaleLimits::default());
    assert_eq!(node.fixed_size(), Size::new(6.0, 4.0));
    node.rect.set_size(Size::new(8.0, 8.0));
    assert_eq!(node.fixed_size(), Size::new(8.0, 8.0));
}

// =============================================================
// Handle hit-testing
// =============================================================

#[test]
fn hit_handle_finds_a_handle_under_the_pointer() {
    let mut node = mounted_shape(0.0, 0.0, 30.0, 30.0);
    node.layout_handles();
    // South-east move handle sits at (15, 15).
    let index = node.hit_handle(Vector::new(15.0, 15.0)).unwrap();
    assert!(matches!(node.handles[index].kind, HandleKind::Move { .. }));
    assert!(node.hit_handle(Vector::new(100.0, 100.0)).is_none());
}

#[test]
fn hit_handle_skips_hidden_handles_when_locked() {
    let mut node = mounted_shape(0.0, 0.0, 30.0, 30.0);
    node.locked = true;
    node.layout_handles();
    // Only the lock handle (at the north-west corner) is reachable.
    assert!(node.hit_handle(Vector::new(15.0, 15.0)).is_none());
    let index = node.hit_handle(Vector::new(-15.0, -15.0)).unwrap();
    assert!(matches!(node.handles[index].kind, HandleKind::Lock));
}

// =============================================================
// SceneStore ordering
// =============================================================

#[test]
fn store_keeps_nodes_ascending_by_layer() {
    let mut store = SceneStore::new();
    let mut high = shape(0.0, 0.0, 1.0, 1.0);
    high.layer = 10;
    let high_id = high.id;
    store.insert(high);
    let mut low = shape(0.0, 0.0, 1.0, 1.0);
    low.layer = -3;
    let low_id = low.id;
    store.insert(low);

    let order: Vec<NodeId> = store.iter().map(|node| node.id).collect();
    assert_eq!(order, vec![low_id, high_id]);
    assert_eq!(store.max_layer(), Some(10));
    assert_eq!(store.min_layer(), Some(-3));
}

#[test]
fn equal_layer_keys_keep_insertion_order() {
    let mut store = SceneStore::new();
    let a = shape(0.0, 0.0, 1.0, 1.0);
    let b = shape(0.0, 0.0, 1.0, 1.0);
    let (a_id, b_id) = (a.id, b.id);
    store.insert(a);
    store.insert(b);
    let order: Vec<NodeId> = store.iter().map(|node| node.id).collect();
    assert_eq!(order, vec![a_id, b_id]);
}

#[test]
fn remove_returns_the_node_and_shrinks_the_store() {
    let mut store = SceneStore::new();
    let node = shape(0.0, 0.0, 1.0, 1.0);
    let id = node.id;
    store.insert(node);
    assert_eq!(store.len(), 1);
    let removed = store.remove(id).unwrap();
    assert_eq!(removed.id, id);
    assert!(store.is_empty());
    assert!(store.remove(id).is_none());
}

#[test]
fn iter_top_down_reverses_layer_order() {
    let mut store = SceneStore::new();
    for layer in 0..3 {
        let mut node = shape(0.0, 0.0, 1.0, 1.0);
        node.layer = layer;
        store.insert(node);
    }
    let layers: Vec<i64> = store.iter_top_down().map(|node| node.layer).collect();
    assert_eq!(layers, vec![2, 1, 0]);
}
