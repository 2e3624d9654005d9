//! Custom cursor state
//!
//! The cursor is two layers, a small dot and a trailing ring, positioned from
//! the pointer tracker's coalesced samples. Styling is computed here and
//! applied to the DOM by the WASM entry point.

use glam::Vec2;

/// Elements that switch the cursor into its hover appearance
///
/// Matched with `Element::closest`, so descendants count too.
pub const INTERACTIVE_SELECTOR: &str =
    "button, a, input, textarea, select, [role=\"button\"], .cursor-pointer, .group";

/// Cursor layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorLayer {
    Dot,
    Trail,
}

impl CursorLayer {
    /// Half the rendered size in pixels, used to center the layer on the pointer
    fn radius(self) -> f32 {
        match self {
            CursorLayer::Dot => 6.0,
            CursorLayer::Trail => 16.0,
        }
    }

    fn hover_scale(self) -> f32 {
        match self {
            CursorLayer::Dot => 1.5,
            CursorLayer::Trail => 1.3,
        }
    }

    /// Opacity at rest and while hovering
    fn opacities(self) -> (f32, f32) {
        match self {
            CursorLayer::Dot => (1.0, 0.9),
            CursorLayer::Trail => (0.5, 0.3),
        }
    }
}

/// Pointer position, visibility and hover flag
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CursorState {
    /// Client coordinates in pixels
    pub position: Vec2,
    pub visible: bool,
    pub hovering: bool,
}

impl CursorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow the pointer; the cursor appears on the first move
    pub fn moved(&mut self, position: Vec2) {
        self.position = position;
        self.visible = true;
    }

    /// The pointer left the window
    pub fn left(&mut self) {
        self.visible = false;
    }

    pub fn set_hovering(&mut self, hovering: bool) {
        self.hovering = hovering;
    }

    pub fn scale(&self, layer: CursorLayer) -> f32 {
        if self.hovering { layer.hover_scale() } else { 1.0 }
    }

    pub fn opacity(&self, layer: CursorLayer) -> f32 {
        if !self.visible {
            return 0.0;
        }
        let (rest, hover) = layer.opacities();
        if self.hovering { hover } else { rest }
    }

    /// CSS `transform` for a layer
    pub fn transform(&self, layer: CursorLayer) -> String {
        let offset = self.position - Vec2::splat(layer.radius());
        format!(
            "translate3d({}px, {}px, 0) scale({})",
            offset.x,
            offset.y,
            self.scale(layer)
        )
    }
}
