//! 2D Canvas rendering for the particle background
//!
//! Projects the particle field through a perspective camera and draws it to an
//! HTML canvas with additive blending.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::particles::ParticleField;
use crate::projection::Projection;

/// Point diameter in world units
pub const POINT_SIZE: f32 = 0.08;

/// Opacity applied to every point
pub const POINT_OPACITY: f32 = 0.7;

/// Smallest radius drawn, in pixels
const MIN_POINT_RADIUS: f32 = 0.75;

/// CSS color string for a normalized RGB triple
pub fn css_rgba(rgb: [f32; 3], alpha: f32) -> String {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({}, {}, {}, {:.3})",
        channel(rgb[0]),
        channel(rgb[1]),
        channel(rgb[2]),
        alpha.clamp(0.0, 1.0)
    )
}

/// Background renderer bound to one canvas
pub struct BackgroundRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    projection: Projection,
}

impl BackgroundRenderer {
    /// Create renderer from canvas element
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| format!("Failed to get 2d context: {:?}", e))?
            .ok_or("2d context not available")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "Failed to cast to CanvasRenderingContext2d")?;

        let projection = Projection::new(canvas.width() as f32, canvas.height() as f32);
        Ok(Self {
            canvas,
            ctx,
            projection,
        })
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Update canvas dimensions
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.projection.resize(width as f32, height as f32);
    }

    /// Draw one frame
    pub fn render(&self, field: &ParticleField) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.projection.width as f64,
            self.projection.height as f64,
        );
        if self.ctx.set_global_composite_operation("lighter").is_err() {
            tracing::debug!("additive blending unavailable");
        }

        self.render_lines(field);
        self.render_points(field);

        let _ = self.ctx.set_global_composite_operation("source-over");
    }

    /// Connection lines, drawn first so points sit on top
    fn render_lines(&self, field: &ParticleField) {
        let particles = field.particles();
        self.ctx.set_line_width(1.0);

        for edge in field.edges() {
            let from = self.projection.project(particles[edge.a].position);
            let to = self.projection.project(particles[edge.b].position);
            let (Some((from, _)), Some((to, _))) = (from, to) else {
                continue;
            };

            self.ctx
                .set_stroke_style_str(&css_rgba(crate::particles::colors::LINE, edge.opacity));
            self.ctx.begin_path();
            self.ctx.move_to(from.x as f64, from.y as f64);
            self.ctx.line_to(to.x as f64, to.y as f64);
            self.ctx.stroke();
        }
    }

    fn render_points(&self, field: &ParticleField) {
        let palette = field.geometry().colors;

        for (i, particle) in field.particles().iter().enumerate() {
            let Some((center, scale)) = self.projection.project(particle.position) else {
                continue;
            };
            let radius = (POINT_SIZE * scale / 2.0).max(MIN_POINT_RADIUS);
            let rgb = [palette[i * 3], palette[i * 3 + 1], palette[i * 3 + 2]];

            self.ctx.begin_path();
            self.ctx
                .arc(
                    center.x as f64,
                    center.y as f64,
                    radius as f64,
                    0.0,
                    std::f64::consts::TAU,
                )
                .ok();
            self.ctx.set_fill_style_str(&css_rgba(rgb, POINT_OPACITY));
            self.ctx.fill();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::colors;

    #[test]
    fn css_colors() {
        assert_eq!(css_rgba(colors::LINE, 0.4), "rgba(68, 85, 102, 0.400)");
        assert_eq!(css_rgba([1.0, 0.0, 2.0], 1.5), "rgba(255, 0, 255, 1.000)");
    }
}
