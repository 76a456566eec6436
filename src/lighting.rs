use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Surface finish selecting one of the two specular variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finish {
    /// White highlights, exponent 32.
    Plastic,
    /// Highlights tinted by the base color, exponent 64.
    Metal,
}

impl Finish {
    pub fn shininess(self) -> f32 {
        match self {
            Finish::Plastic => 32.0,
            Finish::Metal => 64.0,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "plastic" => Some(Finish::Plastic),
            "metal" => Some(Finish::Metal),
            _ => None,
        }
    }
}

/// Inputs to the per-pixel shading model.
///
/// All positions are in view space; `light_position` must be transformed
/// by the caller before shading (see [`view_space`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingParams {
    pub light_position: Vec3,
    pub ambient_intensity: f32,
    pub base_color: Vec3,
}

/// Reference implementation of the fragment shading math.
///
/// `normal` is the view-space surface normal, `position` the view-space
/// fragment position. The result is ambient + diffuse + specular with
/// components deliberately left un-clamped above 1; the render target
/// clamps on write. Matches the WGSL in `render::shared` term for term.
pub fn shade(normal: Vec3, position: Vec3, params: &ShadingParams, finish: Finish) -> Vec3 {
    let normal = normal.normalize_or_zero();
    let ambient = params.ambient_intensity * params.base_color;

    let light_dir = (params.light_position - position).normalize_or_zero();
    let diff = normal.dot(light_dir).max(0.0);
    let diffuse = diff * params.base_color;

    let view_dir = (-position).normalize_or_zero();
    let specular = match finish {
        Finish::Plastic => {
            let reflect_dir = reflect(-light_dir, normal);
            let spec = view_dir.dot(reflect_dir).max(0.0).powf(32.0);
            spec * Vec3::ONE
        }
        Finish::Metal => {
            let half_dir = (light_dir + view_dir).normalize_or_zero();
            let spec = normal.dot(half_dir).max(0.0).powf(64.0);
            spec * params.base_color
        }
    };

    ambient + diffuse + specular
}

/// Transforms a world-space point into view space.
///
/// The shader consumes the light position in view space; this is the
/// per-frame transform applied to the cube's position before it is
/// written into the global uniform.
pub fn view_space(view: Mat4, world: Vec3) -> Vec3 {
    (view * world.extend(1.0)).truncate()
}

fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * incident.dot(normal) * normal
}
