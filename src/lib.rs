//! Building blocks for the extruded-glyph lighting demo.
//!
//! The crate exposes the scene assembly, the per-pixel shading model and
//! the glyph extrusion pipeline as plain library code so everything can
//! be exercised headless.  Window and GPU integration live behind
//! `render` and the binary; nothing else touches the platform.

pub mod app;
pub mod config;
pub mod data_model;
pub mod extrude;
pub mod font;
pub mod frame;
pub mod input;
pub mod lighting;
pub mod mesh;
pub mod render;
pub mod scene;

pub use config::{SceneConfig, TextConfig, MOVE_SPEED, ROTATION_STEP};
pub use data_model::SceneGraph;
pub use extrude::{extrude, ExtrudeOptions};
pub use font::{FontHandle, FontStatus, GlyphOutline, LoadedFont};
pub use frame::{advance_frame, FrameState};
pub use input::{InputState, KeyCode, MovementFlags};
pub use lighting::{shade, view_space, Finish, ShadingParams};
pub use mesh::MeshData;
pub use render::{CameraParams, Renderer};
pub use scene::{NodeKind, Scene, SceneNode};
