use crate::hit_tester::Rect;
use orgraph_core::Vec2;
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 4.0;

/// Pan and zoom of the canvas. `screen = graph * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn screen_to_graph(&self, screen: Vec2) -> Vec2 {
        (screen - self.pan).scale(1.0 / self.zoom)
    }

    pub fn graph_to_screen(&self, graph: Vec2) -> Vec2 {
        graph.scale(self.zoom) + self.pan
    }

    pub fn pan_by(&mut self, screen_delta: Vec2) {
        self.pan = self.pan + screen_delta;
    }

    /// Multiply zoom by `factor`, keeping the graph point under `anchor`
    /// (screen space) fixed.
    pub fn zoom_at(&mut self, factor: f32, anchor: Vec2) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let fixed = self.screen_to_graph(anchor);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = anchor - fixed.scale(self.zoom);
    }

    /// Graph-space point at the middle of a viewport of `size` pixels.
    pub fn center_in_graph(&self, size: Vec2) -> Vec2 {
        self.screen_to_graph(size.scale(0.5))
    }

    /// Zoom and pan so that `bounds` fits inside `size` with `padding`
    /// pixels on each side.
    pub fn fit(&mut self, bounds: Rect, size: Vec2, padding: f32) {
        let avail_w = (size.x - 2.0 * padding).max(1.0);
        let avail_h = (size.y - 2.0 * padding).max(1.0);
        let zoom_w = avail_w / bounds.width().max(1.0);
        let zoom_h = avail_h / bounds.height().max(1.0);
        self.zoom = zoom_w.min(zoom_h).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = size.scale(0.5) - bounds.center().scale(self.zoom);
    }
}
