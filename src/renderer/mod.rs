//! WebGPU rendering module
//!
//! Games emit triangle lists in screen pixels; the pipeline letterboxes them
//! into the viewport.

pub mod canvas;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use canvas::Canvas;
pub use pipeline::RenderState;
pub use vertex::{Vertex, colors, rgb, with_alpha};
