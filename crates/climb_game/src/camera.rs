//! Smoothed follow camera with an independently smoothed zoom factor.
//!
//! `position` is the lower-left corner of the visible window in world space
//! (Y up). Each tick the camera moves a fixed fraction of the way toward the
//! window centred on its target, so it trails the body without overshooting.
//! The target window is clamped to the map, so a converged camera never
//! shows anything outside `[0, map_width] x [0, map_height]`.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec2,
    pub viewport: Vec2,
    pub zoom: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec2,
    /// Window size at zoom 1.0, in map pixels.
    pub base_size: Vec2,
    pub zoom: f32,
    pub map_size: Vec2,
}

impl Camera {
    pub fn new(base_width: f32, base_height: f32, map_size: Vec2) -> Self {
        Self {
            position: Vec2::ZERO,
            base_size: Vec2::new(base_width, base_height),
            zoom: 1.0,
            map_size,
        }
    }

    /// Window size for a zoom factor; zoom < 1.0 shows more of the map.
    pub fn viewport_at(&self, zoom: f32) -> Vec2 {
        self.base_size / zoom
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport_at(self.zoom)
    }

    /// Window origin that centres `center`, kept inside the map.
    pub fn clamped_target(&self, center: Vec2, zoom: f32) -> Vec2 {
        let viewport = self.viewport_at(zoom);
        (center - viewport * 0.5)
            .min(self.map_size - viewport)
            .max(Vec2::ZERO)
    }

    /// Track a box given by its lower-left corner and half extents.
    pub fn update(&mut self, target_position: Vec2, target_half_size: Vec2, smoothing: f32, zoom: f32) {
        self.zoom = zoom;
        let target = self.clamped_target(target_position + target_half_size, zoom);
        self.position += (target - self.position) * smoothing;
    }

    /// Jump straight to the target, e.g. at spawn.
    pub fn snap_to(&mut self, target_position: Vec2, target_half_size: Vec2, zoom: f32) {
        self.zoom = zoom;
        self.position = self.clamped_target(target_position + target_half_size, zoom);
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            viewport: self.viewport(),
            zoom: self.zoom,
        }
    }
}

/// Zoom factor eased toward its target by the same rule as camera position,
/// with its own coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedZoom {
    pub current: f32,
    pub smoothing: f32,
}

impl SmoothedZoom {
    pub fn new(smoothing: f32) -> Self {
        Self {
            current: 1.0,
            smoothing,
        }
    }

    pub fn approach(&mut self, target: f32) -> f32 {
        self.current += (target - self.current) * self.smoothing;
        self.current
    }
}
