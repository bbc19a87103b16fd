use cubeview_common::{CameraSettings, MoveDirection};
use glam::{Mat4, Vec2, Vec3};

/// Pitch is clamped to ±this many degrees to keep `front` away from `up`.
pub const PITCH_LIMIT_DEGREES: f32 = 89.0;
pub const FOV_MIN_DEGREES: f32 = 1.0;
pub const FOV_MAX_DEGREES: f32 = 90.0;

/// First-person fly camera. Angles are stored in degrees.
///
/// Camera state lives outside any simulation; it is owned by the frame loop
/// and mutated only through the update methods below.
#[derive(Debug, Clone)]
pub struct FirstPersonCamera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    yaw: f32,
    pitch: f32,
    fov: f32,
    speed: f32,
    sensitivity: f32,
    /// `None` until the first pointer event establishes a baseline.
    last_cursor: Option<Vec2>,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default())
    }
}

impl FirstPersonCamera {
    pub fn from_settings(settings: &CameraSettings) -> Self {
        let pitch = settings
            .pitch_degrees
            .clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);
        Self {
            position: settings.position,
            front: front_from_angles(settings.yaw_degrees, pitch),
            up: Vec3::Y,
            yaw: settings.yaw_degrees,
            pitch,
            fov: settings.fov_degrees.clamp(FOV_MIN_DEGREES, FOV_MAX_DEGREES),
            speed: settings.speed,
            sensitivity: settings.sensitivity,
            last_cursor: None,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Unit strafe axis, `normalize(front × up)`.
    pub fn right(&self) -> Vec3 {
        self.front.cross(self.up).normalize()
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    pub fn field_of_view(&self) -> f32 {
        self.fov
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Move along the view axes by `speed * dt`.
    pub fn translate(&mut self, direction: MoveDirection, dt: f32) {
        let step = self.speed * dt;
        match direction {
            MoveDirection::Forward => self.position += self.front * step,
            MoveDirection::Backward => self.position -= self.front * step,
            MoveDirection::Left => self.position -= self.right() * step,
            MoveDirection::Right => self.position += self.right() * step,
        }
    }

    /// Apply an absolute pointer position in window space.
    ///
    /// The first call after construction (or [`reset_pointer`](Self::reset_pointer))
    /// only records the baseline. Window Y grows downward, so moving the pointer
    /// up raises pitch.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        let cursor = Vec2::new(x, y);
        let last = self.last_cursor.replace(cursor).unwrap_or(cursor);

        let dx = (cursor.x - last.x) * self.sensitivity;
        let dy = (last.y - cursor.y) * self.sensitivity;

        self.yaw += dx;
        let pitch = self.pitch + dy;
        self.pitch = pitch.clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);
        if self.pitch != pitch {
            tracing::trace!(pitch, "pitch saturated");
        }
        self.front = front_from_angles(self.yaw, self.pitch);
    }

    /// Forget the pointer baseline so the next pointer event injects no delta.
    pub fn reset_pointer(&mut self) {
        self.last_cursor = None;
    }

    /// Zoom by a signed scroll offset; scrolling up narrows the field of view.
    pub fn on_scroll(&mut self, y_offset: f32) {
        let fov = self.fov - y_offset;
        self.fov = fov.clamp(FOV_MIN_DEGREES, FOV_MAX_DEGREES);
        if self.fov != fov {
            tracing::trace!(fov, "field of view saturated");
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }
}

fn front_from_angles(yaw_degrees: f32, pitch_degrees: f32) -> Vec3 {
    let (yaw, pitch) = (yaw_degrees.to_radians(), pitch_degrees.to_radians());
    Vec3::new(
        yaw.cos() * pitch.cos(),
        pitch.sin(),
        yaw.sin() * pitch.cos(),
    )
    .normalize()
}
