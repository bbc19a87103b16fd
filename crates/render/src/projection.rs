use cubeview_camera::FirstPersonCamera;
use cubeview_common::{AppConfig, FovSource};
use glam::{Mat4, Vec3};

/// Perspective projection with a fixed aspect ratio and clip planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_source: FovSource,
    /// Vertical field of view in degrees, used when `fov_source` is `Fixed`.
    pub fixed_fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl Projection {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            fov_source: config.projection.fov_source,
            fixed_fov_degrees: config.projection.fixed_fov_degrees,
            aspect: config.aspect_ratio(),
            near: config.projection.near,
            far: config.projection.far,
        }
    }

    /// The field of view this projection uses given the camera's current one.
    pub fn effective_fov(&self, camera_fov_degrees: f32) -> f32 {
        match self.fov_source {
            FovSource::Camera => camera_fov_degrees,
            FovSource::Fixed => self.fixed_fov_degrees,
        }
    }

    /// Right-handed perspective matrix with a 0..1 depth range.
    pub fn matrix(&self, camera_fov_degrees: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.effective_fov(camera_fov_degrees).to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }
}

/// View and projection for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    pub view: Mat4,
    pub projection: Mat4,
    /// Camera position in world space.
    pub eye: Vec3,
}

impl FrameView {
    pub fn new(camera: &FirstPersonCamera, projection: &Projection) -> Self {
        Self {
            view: camera.view_matrix(),
            projection: projection.matrix(camera.field_of_view()),
            eye: camera.position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_projection() {
        let proj = Projection::default();
        assert_eq!(proj.fov_source, FovSource::Camera);
        assert!((proj.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(proj.near, 0.1);
        assert_eq!(proj.far, 100.0);
    }

    #[test]
    fn camera_fov_drives_projection() {
        let proj = Projection::default();
        let mut cam = FirstPersonCamera::default();
        let before = FrameView::new(&cam, &proj).projection;

        cam.on_scroll(10.0);
        let after = FrameView::new(&cam, &proj).projection;
        assert_ne!(before, after);
        assert_eq!(after, proj.matrix(35.0));
        // Narrower fov magnifies: larger y scale.
        assert!(after.y_axis.y > before.y_axis.y);
    }

    #[test]
    fn fixed_fov_ignores_zoom() {
        let proj = Projection {
            fov_source: FovSource::Fixed,
            ..Projection::default()
        };
        let mut cam = FirstPersonCamera::default();
        let before = FrameView::new(&cam, &proj).projection;
        cam.on_scroll(30.0);
        let after = FrameView::new(&cam, &proj).projection;
        assert_eq!(before, after);
        assert_eq!(proj.effective_fov(cam.field_of_view()), 90.0);
    }

    #[test]
    fn accepted_fixed_fov_stays_upright() {
        let mut config = AppConfig::default();
        config.projection.fov_source = FovSource::Fixed;
        for fov in [1.0, 90.0, 179.0] {
            config.projection.fixed_fov_degrees = fov;
            config.validate().unwrap();
            let y_scale = Projection::from_config(&config).matrix(45.0).y_axis.y;
            assert!(y_scale.is_finite() && y_scale > 0.0, "fov {fov}: {y_scale}");
        }
    }

    #[test]
    fn point_ahead_projects_inside_clip_volume() {
        let cam = FirstPersonCamera::default();
        let frame = FrameView::new(&cam, &Projection::default());
        // The origin cube sits 3 units ahead of the default camera.
        let clip = frame.projection * frame.view * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(clip.w > 0.0);
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
        assert_eq!(frame.eye, cam.position());
    }
}
