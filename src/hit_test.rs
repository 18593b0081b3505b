use std::f64::consts::FRAC_PI_4;

use super::*;
use crate::geometry::Size;
use crate::node::{NodeKind, SceneNode, ShapeKind};

fn shape_node(x: f64, y: f64, w: f64, h: f64) -> SceneNode {
    let mut node = SceneNode::new(
        NodeKind::Shape { shape: ShapeKind::Rect },
        Vector::new(x, y),
        Size::new(w, h),
    );
    node.mount();
    node
}

// =============================================================
// in_area
// =============================================================

#[test]
fn point_inside_axis_aligned_rect() {
    let node = shape_node(10.0, 10.0, 8.0, 4.0);
    assert!(in_area(&node.rect, Vector::new(10.0, 10.0)));
    assert!(in_area(&node.rect, Vector::new(13.5, 11.5)));
}

#[test]
fn point_outside_axis_aligned_rect() {
    let node = shape_node(10.0, 10.0, 8.0, 4.0);
    assert!(!in_area(&node.rect, Vector::new(15.0, 10.0)));
    assert!(!in_area(&node.rect, Vector::new(10.0, 13.0)));
    assert!(!in_area(&node.rect, Vector::new(-100.0, -100.0)));
}

#[test]
fn rotation_moves_the_hit_region() {
    // A wide, short rect rotated 45 degrees: a point near the old right
    // edge falls outside, while a point along the rotated long axis is in.
    let mut node = shape_node(0.0, 0.0, 20.0, 2.0);
    node.rect.set_angle(FRAC_PI_4);
    node.refresh_vertices();

    assert!(!in_area(&node.rect, Vector::new(9.0, 0.0)));
    assert!(in_area(&node.rect, Vector::new(6.0, 6.0)));
}

#[test]
fn rotated_point_and_rotated_rect_agree() {
    // Rotating both the rect and the probe point by the same angle must
    // preserve containment.
    let probe = Vector::new(3.0, 1.0);
    let node = shape_node(0.0, 0.0, 8.0, 4.0);
    assert!(in_area(&node.rect, probe));

    let mut rotated = shape_node(0.0, 0.0, 8.0, 4.0);
    rotated.rect.set_angle(1.1);
    rotated.refresh_vertices();
    assert!(in_area(&rotated.rect, probe.rotated(1.1)));
}

#[test]
fn scaled_rect_grows_the_hit_region() {
    let mut node = shape_node(0.0, 0.0, 4.0, 4.0);
    assert!(!in_area(&node.rect, Vector::new(3.0, 0.0)));
    node.set_delta_scale(2.0, crate::geometry::ScaleLimits::default());
    node.refresh_vertices();
    assert!(in_area(&node.rect, Vector::new(3.0, 0.0)));
}

// =============================================================
// in_circle
// =============================================================

#[test]
fn in_circle_inside_and_boundary() {
    let center = Vector::new(5.0, 5.0);
    assert!(in_circle(center, Vector::new(5.0, 5.0), 1.0));
    assert!(in_circle(center, Vector::new(6.0, 5.0), 1.0));
    assert!(!in_circle(center, Vector::new(6.1, 5.0), 1.0));
}

// =============================================================
// catch_node
// =============================================================

#[test]
fn catch_node_returns_topmost_overlap() {
    let mut store = SceneStore::new();
    store.insert(shape_node(0.0, 0.0, 10.0, 10.0));
    let mut top = shape_node(0.0, 0.0, 10.0, 10.0);
    top.layer = 5;
    let top_id = top.id;
    store.insert(top);

    assert_eq!(catch_node(&store, Vector::new(0.0, 0.0)), Some(top_id));
    assert_eq!(catch_node(&store, Vector::new(50.0, 50.0)), None);
}

#[test]
fn catch_node_skips_disabled_and_background() {
    let mut store = SceneStore::new();
    let mut background = shape_node(0.0, 0.0, 10.0, 10.0);
    background.background = true;
    store.insert(background);
    let mut disabled = shape_node(0.0, 0.0, 10.0, 10.0);
    disabled.disabled = true;
    disabled.layer = 1;
    store.insert(disabled);

    assert_eq!(catch_node(&store, Vector::new(0.0, 0.0)), None);
}

#[test]
fn catch_node_falls_through_to_lower_node() {
    let mut store = SceneStore::new();
    let wide = shape_node(0.0, 0.0, 20.0, 20.0);
    let wide_id = wide.id;
    store.insert(wide);
    let mut small = shape_node(0.0, 0.0, 4.0, 4.0);
    small.layer = 1;
    store.insert(small);

    // Inside the wide node but outside the small one on top.
    assert_eq!(catch_node(&store, Vector::new(8.0, 8.0)), Some(wide_id));
}
