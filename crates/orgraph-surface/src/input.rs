use orgraph_core::Vec2;
use serde::{Deserialize, Serialize};

/// Pointer input in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up(Vec2),
    DoubleClick(Vec2),
    /// Wheel notches; positive zooms in around `pos`.
    Wheel { pos: Vec2, delta: f32 },
}

/// Which edge overlays are drawn. Hidden edges stay in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeVisibility {
    pub administrative: bool,
    pub functional: bool,
}

impl Default for EdgeVisibility {
    fn default() -> Self {
        Self {
            administrative: true,
            functional: true,
        }
    }
}

impl EdgeVisibility {
    pub fn shows(&self, category: orgraph_core::EdgeCategory) -> bool {
        match category {
            orgraph_core::EdgeCategory::Administrative => self.administrative,
            orgraph_core::EdgeCategory::Functional => self.functional,
        }
    }
}
