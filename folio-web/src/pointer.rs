//! Pointer tracking with per-frame coalescing
//!
//! Raw pointer-move samples are recorded as they arrive; only the latest one
//! is applied when the next animation frame runs.

use glam::Vec2;

use crate::particles::Viewport;

/// Pointer position relative to the window center, each axis in [-0.5, 0.5]
///
/// `y` grows downward, matching screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    pub const ORIGIN: PointerState = PointerState { x: 0.0, y: 0.0 };

    /// Map into scene coordinates for a viewport (y up)
    pub fn to_world(self, viewport: Viewport) -> Vec2 {
        Vec2::new(self.x * viewport.width, -self.y * viewport.height)
    }
}

/// Tracks the latest pointer sample and publishes it once per frame
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    width: f32,
    height: f32,
    pending: Option<Vec2>,
    client: Option<Vec2>,
    current: PointerState,
}

impl PointerTracker {
    /// Create a tracker for a window of the given pixel size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            ..Default::default()
        }
    }

    /// Update window dimensions
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    /// Record a raw sample in client pixels
    ///
    /// Returns `true` when this is the first sample since the last frame,
    /// i.e. when the caller needs to schedule a frame.
    pub fn record(&mut self, client_x: f32, client_y: f32) -> bool {
        let first = self.pending.is_none();
        self.pending = Some(Vec2::new(client_x, client_y));
        first
    }

    /// Apply the latest pending sample, if any, and return the position
    pub fn on_frame(&mut self) -> PointerState {
        if let Some(sample) = self.pending.take() {
            self.client = Some(sample);
            self.current = PointerState {
                x: normalize(sample.x, self.width),
                y: normalize(sample.y, self.height),
            };
        }
        self.current
    }

    /// Latest published position
    pub fn position(&self) -> PointerState {
        self.current
    }

    /// Latest published sample in client pixels
    pub fn client_position(&self) -> Option<Vec2> {
        self.client
    }
}

fn normalize(value: f32, extent: f32) -> f32 {
    if extent <= 0.0 {
        return 0.0;
    }
    (value / extent - 0.5).clamp(-0.5, 0.5)
}
