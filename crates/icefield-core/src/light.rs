use crate::constants::*;
use glam::{Mat4, Vec3};

/// Shadow-map settings of a shadow-casting light.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadowConfig {
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    pub fov_degrees: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: SHADOW_MAP_SIZE,
            near: SHADOW_NEAR,
            far: SHADOW_FAR,
            fov_degrees: SHADOW_FOV_DEG,
        }
    }
}

/// Directional light aimed from `position` at `target`.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Linear RGB in [0, 1].
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub cast_shadow: bool,
    pub shadow: ShadowConfig,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: rgb_from_hex(LIGHT_COLOR_HEX),
            intensity: LIGHT_INTENSITY,
            position: LIGHT_POSITION,
            target: Vec3::ZERO,
            cast_shadow: true,
            shadow: ShadowConfig::default(),
        }
    }
}

impl DirectionalLight {
    /// Unit vector pointing from the lit surface toward the light.
    pub fn direction_to_light(&self) -> Vec3 {
        (self.position - self.target).normalize_or_zero()
    }

    /// World-to-clip transform of the shadow camera.
    pub fn shadow_view_projection(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(
            self.shadow.fov_degrees.to_radians(),
            1.0,
            self.shadow.near,
            self.shadow.far,
        );
        let view = Mat4::look_at_rh(self.position, self.target, Vec3::Y);
        proj * view
    }
}

/// `0xRRGGBB` to RGB in [0, 1].
pub fn rgb_from_hex(hex: u32) -> Vec3 {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    Vec3::new(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn hex_color_unpacks_channels() {
        let c = rgb_from_hex(0xdcfaf3);
        assert!((c.x - 220.0 / 255.0).abs() < 1e-6);
        assert!((c.y - 250.0 / 255.0).abs() < 1e-6);
        assert!((c.z - 243.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn default_light_matches_scene_setup() {
        let light = DirectionalLight::default();
        assert_eq!(light.intensity, 5.0);
        assert!(light.cast_shadow);
        assert_eq!(light.shadow.map_size, 4096);
        assert_eq!(light.shadow.near, 500.0);
        assert_eq!(light.shadow.far, 2000.0);
        assert_eq!(light.shadow.fov_degrees, 45.0);
    }

    #[test]
    fn origin_falls_inside_shadow_frustum() {
        let light = DirectionalLight::default();
        let clip = light.shadow_view_projection() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-3 && ndc.y.abs() < 1e-3);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
