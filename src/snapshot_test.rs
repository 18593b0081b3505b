#![allow(clippy::float_cmp)]

use approx::assert_relative_eq;

use super::*;
use crate::geometry::ScaleLimits;
use crate::node::ShapeKind;

fn sample_node() -> SceneNode {
    let mut node = SceneNode::new(
        NodeKind::Shape { shape: ShapeKind::Star },
        Vector::new(12.0, 34.0),
        Size::new(50.0, 30.0),
    );
    node.rect.set_angle(0.7);
    node.rect.set_delta_scale(1.5, ScaleLimits::default());
    node.rect.commit_scale();
    node.mirrored = true;
    node.locked = true;
    node.opacity = 0.8;
    node.layer = 4;
    node.decoration = Some(Decoration::new(DecorationKind::Frame));
    node
}

fn scene_json(store: &SceneStore) -> String {
    serde_json::to_string(&export_scene(store)).unwrap()
}

// =============================================================
// Node round-trip
// =============================================================

#[test]
fn node_round_trip_preserves_geometry_and_flags() {
    let original = sample_node();
    let record = NodeRecord::from_node(&original);
    let restored = record.into_node(ScaleLimits::default()).unwrap();

    assert_eq!(restored.id, original.id);
    assert_eq!(restored.rect.position(), Vector::new(12.0, 34.0));
    assert_eq!(restored.rect.size(), Size::new(50.0, 30.0));
    assert_relative_eq!(restored.rect.angle(), 0.7);
    assert_relative_eq!(restored.rect.scale(), 1.5);
    assert!(restored.mirrored);
    assert!(restored.locked);
    assert!(!restored.background);
    assert_relative_eq!(restored.opacity, 0.8);
    assert_eq!(restored.layer, 4);
    assert_eq!(restored.kind, original.kind);
}

#[test]
fn node_round_trip_preserves_handle_ids_and_kinds() {
    let original = sample_node();
    let restored = NodeRecord::from_node(&original).into_node(ScaleLimits::default()).unwrap();

    assert_eq!(restored.handles.len(), original.handles.len());
    for (a, b) in original.handles.iter().zip(&restored.handles) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.alignment, b.alignment);
        assert_eq!(a.trigger, b.trigger);
        assert_eq!(a.free, b.free);
    }
}

#[test]
fn transient_scale_is_never_persisted() {
    let mut node = sample_node();
    node.rect.set_delta_scale(2.0, ScaleLimits::default());
    let record = NodeRecord::from_node(&node);
    // Committed 1.5 only; the in-flight 2.0 gesture factor is dropped.
    assert_relative_eq!(record.scale, 1.5);
    let restored = record.into_node(ScaleLimits::default()).unwrap();
    assert_relative_eq!(restored.rect.total_scale(), 1.5);
    assert_relative_eq!(restored.rect.delta_scale(), 1.0);
}

#[test]
fn restore_clamps_through_the_supplied_limits() {
    let wide = ScaleLimits { min: 0.1, max: 10.0 };
    let mut node = sample_node();
    node.rect.commit_scale();
    node.rect.set_delta_scale(8.0 / node.rect.scale(), wide);
    node.rect.commit_scale();
    let record = NodeRecord::from_node(&node);
    assert_relative_eq!(record.scale, 8.0);

    // The limits the scene ran under keep the scale intact.
    let restored = record.clone().into_node(wide).unwrap();
    assert_relative_eq!(restored.rect.scale(), 8.0);

    // Narrower limits clamp on the way in.
    let clamped = record.into_node(ScaleLimits::default()).unwrap();
    assert_relative_eq!(clamped.rect.scale(), 5.0);
}

#[test]
fn restored_node_is_unmounted() {
    let restored = NodeRecord::from_node(&sample_node()).into_node(ScaleLimits::default()).unwrap();
    assert!(!restored.mounted());
}

#[test]
fn decoration_round_trips_by_name() {
    let node = sample_node();
    let record = NodeRecord::from_node(&node);
    assert_eq!(record.decoration.as_ref().unwrap().kind, "frame");
    let restored = record.into_node(ScaleLimits::default()).unwrap();
    assert_eq!(restored.decoration.unwrap().kind, DecorationKind::Frame);
}

#[test]
fn unknown_decoration_rejects_the_record() {
    let mut record = NodeRecord::from_node(&sample_node());
    record.decoration = Some(DecorationRecord {
        kind: "sparkle".to_owned(),
        color: "#fff".to_owned(),
        width: 1.0,
    });
    let err = record.into_node(ScaleLimits::default()).unwrap_err();
    assert!(matches!(err, ImportError::UnknownDecoration(UnknownDecoration(name)) if name == "sparkle"));
}

// =============================================================
// Handle records
// =============================================================

#[test]
fn handle_trigger_is_rederived_from_kind() {
    let lock = Handle::new(HandleKind::Lock, Alignment::Nw);
    let restored = HandleRecord::from_handle(&lock).into_handle();
    assert_eq!(restored.trigger, crate::handle::Trigger::Click);

    let rotate = Handle::new(HandleKind::Rotate, Alignment::N);
    let restored = HandleRecord::from_handle(&rotate).into_handle();
    assert_eq!(restored.trigger, crate::handle::Trigger::Drag);
}

// =============================================================
// Scene payload parsing
// =============================================================

#[test]
fn export_scene_lists_nodes_back_to_front() {
    let mut store = SceneStore::new();
    let mut top = sample_node();
    top.layer = 9;
    let top_id = top.id;
    store.insert(top);
    let mut bottom = sample_node();
    bottom.layer = 1;
    let bottom_id = bottom.id;
    store.insert(bottom);

    let record = export_scene(&store);
    assert_eq!(record.nodes[0].id, bottom_id);
    assert_eq!(record.nodes[1].id, top_id);
}

#[test]
fn scene_json_round_trip() {
    let mut store = SceneStore::new();
    store.insert(sample_node());
    store.insert(sample_node());

    let nodes = parse_scene(&scene_json(&store), ScaleLimits::default()).unwrap();
    assert_eq!(nodes.len(), 2);
    for (restored, original) in nodes.iter().zip(store.iter()) {
        assert_eq!(restored.id, original.id);
        assert_eq!(restored.rect.position(), original.rect.position());
        assert_relative_eq!(restored.rect.scale(), original.rect.scale());
    }
}

#[test]
fn empty_payload_is_rejected() {
    assert!(matches!(parse_scene("", ScaleLimits::default()), Err(ImportError::EmptyPayload)));
    assert!(matches!(
        parse_scene("   \n\t", ScaleLimits::default()),
        Err(ImportError::EmptyPayload)
    ));
}

#[test]
fn malformed_json_is_rejected() {
    assert!(matches!(
        parse_scene("{not json", ScaleLimits::default()),
        Err(ImportError::Malformed(_))
    ));
    assert!(matches!(
        parse_scene("{\"nodes\": 7}", ScaleLimits::default()),
        Err(ImportError::Malformed(_))
    ));
}

#[test]
fn one_bad_record_rejects_the_whole_payload() {
    let mut store = SceneStore::new();
    store.insert(sample_node());
    store.insert(sample_node());
    let mut payload = scene_json(&store);
    // Corrupt one decoration name; nothing from the payload may survive.
    payload = payload.replacen("\"frame\"", "\"sparkle\"", 1);

    assert!(matches!(
        parse_scene(&payload, ScaleLimits::default()),
        Err(ImportError::UnknownDecoration(_))
    ));
}
