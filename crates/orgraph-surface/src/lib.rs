//! Pointer handling and scene building for the organization graph canvas.

mod input;
mod scene;
mod surface;

pub use input::{EdgeVisibility, PointerEvent};
pub use scene::{EdgeSprite, NodeSprite, Scene};
pub use surface::{
    DEFAULT_VIEWPORT_SIZE, DRAG_THRESHOLD, FIT_PADDING, GraphSurface, ZOOM_STEP,
};
