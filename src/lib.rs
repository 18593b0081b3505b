//! Interactive 2D scene-editing engine.
//!
//! This crate owns the full lifecycle of an editable canvas scene: oriented
//! rectangles with rotation and scale, hit-testing, drag gestures, a
//! manipulation-handle hierarchy (move, resize, rotate, lock), node mount
//! and unmount, layer ordering, JSON export/import, and the render loop.
//! The host layer is responsible only for wiring pointer events into the
//! [`controller::Controller`] and reacting to the [`controller::Event`]s
//! each handler returns. On `wasm32` the [`canvas2d`] module supplies a
//! `CanvasRenderingContext2d`-backed painter.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`controller`] | Top-level scene controller and input state machine |
//! | [`node`] | Scene nodes, decorations, and the layer-ordered store |
//! | [`geometry`] | Vectors, sizes, and the oriented rectangle |
//! | [`transform`] | Transform notifications and rect observers |
//! | [`hit`] | Point-in-polygon and topmost-node hit-testing |
//! | [`drag`] | Single-session drag coordinator |
//! | [`handle`] | Manipulation handles and their gesture effects |
//! | [`layer`] | Relative and absolute restacking operations |
//! | [`render`] | Node drawing, render cache, and the selection overlay |
//! | [`painter`] | Backend-agnostic drawing trait |
//! | [`snapshot`] | JSON scene export and all-or-nothing import |
//! | [`viewport`] | Coordinate correction and touch-batch selection |
//! | [`consts`] | Shared numeric constants (scale limits, snap step, etc.) |

pub mod consts;
pub mod controller;
pub mod drag;
pub mod geometry;
pub mod handle;
pub mod hit;
pub mod layer;
pub mod node;
pub mod painter;
pub mod render;
pub mod snapshot;
pub mod transform;
pub mod viewport;

#[cfg(target_arch = "wasm32")]
pub mod canvas2d;
