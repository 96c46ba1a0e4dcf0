//! Letterboxed viewport and orthographic projection of a context.

use glam::Mat4;

/// Window-space rectangle rendered into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Largest centred rectangle of the logical aspect ratio fitting the window
    ///
    /// The logical `width x height` area is scaled uniformly to fill the window
    /// along one axis and centred along the other, leaving bars where the
    /// aspect ratios differ.
    pub fn letterbox(width: u32, height: u32, window_width: u32, window_height: u32) -> Viewport {
        if width == 0 || height == 0 {
            return Viewport { x: 0, y: 0, width: window_width, height: window_height };
        }
        let (w, h) = (width as f32, height as f32);
        let (win_w, win_h) = (window_width as f32, window_height as f32);

        let (view_w, view_h) = if win_w > win_h {
            let view_h = (win_w / w * h).min(win_h);
            (view_h / h * w, view_h)
        } else {
            let view_w = (win_h / h * w).min(win_w);
            (view_w, view_w / w * h)
        };

        Viewport {
            x: ((win_w - view_w) / 2.0) as i32,
            y: ((win_h - view_h) / 2.0) as i32,
            width: view_w as u32,
            height: view_h as u32,
        }
    }
}

/// Orthographic projection centred on the origin covering `width x height`
pub fn orthographic_projection(width: u32, height: u32, near: f32, far: f32) -> Mat4 {
    let half_w = width as f32 / 2.0;
    let half_h = height as f32 / 2.0;
    Mat4::orthographic_rh_gl(-half_w, half_w, -half_h, half_h, near, far)
}

#[cfg(test)]
#[path = "viewport_tests.rs"]
mod tests;
