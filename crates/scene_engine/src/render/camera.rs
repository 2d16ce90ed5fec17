//! # Cameras
//!
//! A camera only owns a projection. Its placement in the world comes from the
//! scene node it is attached to: the renderer inverts that node's total
//! transform to get the view matrix.
//!
//! ## Coordinate System
//! Right-handed, Y up, looking down -Z in view space. Clip space follows the
//! OpenGL convention with depth in [-1, 1].

use std::fmt::Debug;

use crate::core::config::CameraConfig;
use crate::foundation::math::Mat4;

/// Projection provider attached to a camera node
pub trait Camera: Debug {
    /// Current projection matrix
    fn projection_matrix(&self) -> &Mat4;
}

/// Perspective camera with an optional infinite far plane
///
/// The projection is recomputed whenever a parameter changes, so
/// [`Camera::projection_matrix`] is always consistent with the getters.
///
/// # Infinite Far Plane
/// A `zfar` of zero or less selects the infinite-far variant of the
/// projection, where depth never clips at the back.
///
/// # Example
/// ```rust
/// use scene_engine::render::{Camera, PerspectiveCamera};
///
/// let camera = PerspectiveCamera::new(16.0 / 9.0, std::f32::consts::FRAC_PI_4, 0.1, 100.0);
/// assert_eq!(camera.projection_matrix()[(3, 2)], -1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    aspect_ratio: f32,
    yfov: f32,
    znear: f32,
    zfar: f32,
    projection: Mat4,
}

impl PerspectiveCamera {
    /// Create a perspective camera
    ///
    /// # Arguments
    /// * `aspect_ratio` - Viewport width over height
    /// * `yfov` - Vertical field of view in radians
    /// * `znear` - Near plane distance (must be > 0)
    /// * `zfar` - Far plane distance, or `<= 0` for an infinite far plane
    pub fn new(aspect_ratio: f32, yfov: f32, znear: f32, zfar: f32) -> Self {
        let mut camera = Self {
            aspect_ratio,
            yfov,
            znear,
            zfar,
            projection: Mat4::identity(),
        };
        camera.update_projection();
        log::debug!(
            "Created perspective camera: aspect {:.3}, yfov {:.3}, near {}, far {}",
            aspect_ratio,
            yfov,
            znear,
            zfar
        );
        camera
    }

    /// Create a camera from configuration and a viewport aspect ratio
    pub fn from_config(config: &CameraConfig, aspect_ratio: f32) -> Self {
        Self::new(aspect_ratio, config.yfov, config.znear, config.zfar)
    }

    /// Viewport aspect ratio
    pub const fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Vertical field of view in radians
    pub const fn yfov(&self) -> f32 {
        self.yfov
    }

    /// Near plane distance
    pub const fn znear(&self) -> f32 {
        self.znear
    }

    /// Far plane distance
    pub const fn zfar(&self) -> f32 {
        self.zfar
    }

    /// Whether the far plane is at infinity
    pub fn is_infinite(&self) -> bool {
        self.zfar <= 0.0
    }

    /// Update the aspect ratio, typically after a viewport resize
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if (self.aspect_ratio - aspect_ratio).abs() > 0.01 {
            log::info!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect_ratio, aspect_ratio);
        }
        self.aspect_ratio = aspect_ratio;
        self.update_projection();
    }

    /// Update the vertical field of view
    pub fn set_yfov(&mut self, yfov: f32) {
        self.yfov = yfov;
        self.update_projection();
    }

    /// Update the near plane
    pub fn set_znear(&mut self, znear: f32) {
        self.znear = znear;
        self.update_projection();
    }

    /// Update the far plane; `<= 0` switches to an infinite far plane
    pub fn set_zfar(&mut self, zfar: f32) {
        self.zfar = zfar;
        self.update_projection();
    }

    fn update_projection(&mut self) {
        let t = (0.5 * self.yfov).tan();
        let n = self.znear;

        let (depth_scale, depth_offset) = if self.is_infinite() {
            (-1.0, -2.0 * n)
        } else {
            let f = self.zfar;
            ((f + n) / (n - f), (2.0 * f * n) / (n - f))
        };

        self.projection = Mat4::new(
            1.0 / (self.aspect_ratio * t), 0.0, 0.0, 0.0,
            0.0, 1.0 / t, 0.0, 0.0,
            0.0, 0.0, depth_scale, depth_offset,
            0.0, 0.0, -1.0, 0.0,
        );
        log::trace!("Perspective projection updated: {:?}", self.projection);
    }
}

impl Camera for PerspectiveCamera {
    fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn test_square_viewport_is_symmetric() {
        let camera = PerspectiveCamera::new(1.0, FRAC_PI_2, 0.1, 100.0);
        let p = camera.projection_matrix();
        assert_relative_eq!(p[(0, 0)], p[(1, 1)]);
        assert_relative_eq!(p[(1, 1)], 1.0, epsilon = 1e-6);
        assert_eq!(p[(3, 2)], -1.0);
        assert_eq!(p[(3, 3)], 0.0);
    }

    #[test]
    fn test_finite_depth_terms() {
        let camera = PerspectiveCamera::new(2.0, FRAC_PI_4, 1.0, 10.0);
        let p = camera.projection_matrix();
        assert_relative_eq!(p[(2, 2)], -11.0 / 9.0, epsilon = 1e-6);
        assert_relative_eq!(p[(2, 3)], -20.0 / 9.0, epsilon = 1e-6);
        assert_relative_eq!(p[(0, 0)], p[(1, 1)] / 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_matches_nalgebra_perspective() {
        let camera = PerspectiveCamera::new(16.0 / 9.0, FRAC_PI_4, 0.1, 100.0);
        let oracle = nalgebra::Perspective3::new(16.0 / 9.0, FRAC_PI_4, 0.1, 100.0);
        assert_relative_eq!(*camera.projection_matrix(), *oracle.as_matrix(), epsilon = 1e-5);
    }

    #[test]
    fn test_infinite_far_plane() {
        let camera = PerspectiveCamera::new(1.5, FRAC_PI_4, 0.5, 0.0);
        assert!(camera.is_infinite());
        let p = camera.projection_matrix();
        assert_eq!(p[(2, 2)], -1.0);
        assert_eq!(p[(2, 3)], -1.0);
        assert_eq!(p[(3, 2)], -1.0);
    }

    #[test]
    fn test_setters_recompute_projection() {
        let mut camera = PerspectiveCamera::new(1.0, FRAC_PI_4, 0.1, 100.0);
        let before = *camera.projection_matrix();
        camera.set_aspect_ratio(2.0);
        assert_relative_eq!(camera.projection_matrix()[(0, 0)], before[(0, 0)] / 2.0, epsilon = 1e-6);

        camera.set_zfar(-1.0);
        assert!(camera.is_infinite());
        assert_eq!(camera.projection_matrix()[(2, 2)], -1.0);

        camera.set_yfov(FRAC_PI_2);
        assert_relative_eq!(camera.projection_matrix()[(1, 1)], 1.0, epsilon = 1e-6);
    }
}
