use glam::DVec2;

/// Pixel scroll deltas (touchpads) are converted to lines at this rate.
pub const PIXELS_PER_LINE: f64 = 20.0;

/// Unbounded pointer position accumulated from relative motion.
///
/// While the OS cursor is captured the window reports motion deltas instead of
/// positions; the camera wants absolute coordinates, so they are summed here.
/// Summed in `f64` like the deltas themselves, so long drags in one direction
/// keep sub-pixel motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualCursor {
    position: DVec2,
}

impl VirtualCursor {
    /// Start at `origin`, typically the window centre.
    pub fn new(origin: DVec2) -> Self {
        Self { position: origin }
    }

    /// Add a motion delta and return the new absolute position.
    pub fn accumulate(&mut self, dx: f64, dy: f64) -> DVec2 {
        self.position += DVec2::new(dx, dy);
        self.position
    }
}

/// A wheel delta as reported by the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollDelta {
    Lines(f32),
    Pixels(f64),
}

impl ScrollDelta {
    /// Signed vertical offset in lines; positive means scrolled up.
    pub fn lines(self) -> f32 {
        match self {
            Self::Lines(y) => y,
            Self::Pixels(y) => (y / PIXELS_PER_LINE) as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeview_camera::FirstPersonCamera;

    #[test]
    fn accumulates_motion() {
        let mut cursor = VirtualCursor::new(DVec2::new(400.0, 300.0));
        cursor.accumulate(10.0, -5.0);
        let pos = cursor.accumulate(2.5, 0.0);
        assert_eq!(pos, DVec2::new(412.5, 295.0));
    }

    #[test]
    fn is_unbounded() {
        let mut cursor = VirtualCursor::new(DVec2::ZERO);
        for _ in 0..100 {
            cursor.accumulate(-1000.0, 1000.0);
        }
        assert_eq!(cursor.accumulate(0.0, 0.0), DVec2::new(-100_000.0, 100_000.0));
    }

    #[test]
    fn keeps_sub_pixel_motion_far_from_origin() {
        // Past 2^24 an f32 can no longer represent half a pixel.
        let far = 2f64.powi(25);
        let mut cursor = VirtualCursor::new(DVec2::new(far, -far));
        cursor.accumulate(0.5, -0.5);
        let pos = cursor.accumulate(0.5, -0.5);
        assert_eq!(pos, DVec2::new(far + 1.0, -far - 1.0));
    }

    #[test]
    fn drives_camera_yaw() {
        let mut cursor = VirtualCursor::new(DVec2::new(400.0, 300.0));
        let mut cam = FirstPersonCamera::default();

        let p = cursor.accumulate(3.0, 0.0).as_vec2();
        cam.on_pointer_move(p.x, p.y);
        assert_eq!(cam.yaw(), -90.0);

        let p = cursor.accumulate(20.0, 0.0).as_vec2();
        cam.on_pointer_move(p.x, p.y);
        assert!((cam.yaw() - -88.0).abs() < 1e-4);
    }

    #[test]
    fn scroll_lines() {
        assert_eq!(ScrollDelta::Lines(1.0).lines(), 1.0);
        assert_eq!(ScrollDelta::Lines(-2.0).lines(), -2.0);
        assert_eq!(ScrollDelta::Pixels(40.0).lines(), 2.0);
        assert_eq!(ScrollDelta::Pixels(-10.0).lines(), -0.5);
    }
}
