//! Rendering module
//!
//! `scene` records a camera-following frame as draw commands (pure), `shapes`
//! tessellates them, and `pipeline` presents the triangles through WebGPU.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderError, RenderState, request_adapter};
pub use scene::{Canvas, DrawCommand, Layer, Viewport, draw_frame, frame_for};
pub use shapes::tessellate;
