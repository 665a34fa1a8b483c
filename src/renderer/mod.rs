//! Presentation layer
//!
//! `scene` turns a state snapshot into a draw list; `pipeline` rasterizes
//! the filled shapes with WebGPU. Text is left to the HUD overlay.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;
pub mod viewport;

pub use pipeline::RenderState;
pub use scene::{DrawCommand, Frame, Palette};
pub use viewport::Viewport;
