use cubeview_common::SceneSettings;
use glam::{Mat4, Vec3};

/// The static content drawn every frame: identical cubes at fixed positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub cube_positions: Vec<Vec3>,
    pub cube_count: usize,
    pub object_color: [f32; 4],
    pub clear_color: [f32; 4],
}

impl Default for Scene {
    fn default() -> Self {
        Self::from_settings(&SceneSettings::default())
    }
}

impl Scene {
    pub fn from_settings(settings: &SceneSettings) -> Self {
        if settings.cube_count > settings.cube_positions.len() {
            tracing::warn!(
                "cube_count {} exceeds {} configured positions; drawing all of them",
                settings.cube_count,
                settings.cube_positions.len()
            );
        }
        Self {
            cube_positions: settings.cube_positions.clone(),
            cube_count: settings.cube_count,
            object_color: settings.object_color,
            clear_color: settings.clear_color,
        }
    }

    /// Positions of the cubes that are drawn.
    pub fn visible_cubes(&self) -> &[Vec3] {
        let n = self.cube_count.min(self.cube_positions.len());
        &self.cube_positions[..n]
    }

    /// Model matrices for the visible cubes.
    pub fn model_matrices(&self) -> impl Iterator<Item = Mat4> + '_ {
        self.visible_cubes()
            .iter()
            .map(|p| Mat4::from_translation(*p))
    }
}
