use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::{SceneConfig, TextConfig};
use crate::lighting::Finish;

/// What a scene node contributes to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Camera,
    LightCube,
    PointLight,
    Text,
}

/// Runtime representation of one object in the scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub color: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fov: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyph: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish: Option<Finish>,
}

impl SceneNode {
    fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            color: Vec3::ONE,
            fov: None,
            intensity: None,
            range: None,
            glyph: None,
            finish: None,
        }
    }

    fn camera(position: Vec3, fov: f32) -> Self {
        Self {
            position,
            fov: Some(fov),
            ..Self::new("Camera", NodeKind::Camera)
        }
    }

    fn light_cube() -> Self {
        // Unit cube drawn unlit in solid white, doubling as the visible
        // light source.
        Self::new("LightCube", NodeKind::LightCube)
    }

    fn point_light(intensity: f32, range: f32) -> Self {
        // Parented to the cube: the frame update keeps its position equal
        // to the cube's.
        Self {
            intensity: Some(intensity),
            range: Some(range),
            ..Self::new("CubeLight", NodeKind::PointLight)
        }
    }

    fn text(index: usize, text: &TextConfig) -> Self {
        Self {
            position: text.position,
            color: text.color,
            glyph: Some(text.glyph),
            finish: Some(text.finish),
            ..Self::new(format!("Text{index}"), NodeKind::Text)
        }
    }
}

/// Assembled scene: one camera, the light cube with its point light, and
/// one text node per configured glyph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    /// Builds the node list once from a configuration. Text nodes are
    /// created immediately; their meshes attach later, when the font
    /// resource resolves.
    pub fn from_config(config: &SceneConfig) -> Self {
        let mut nodes = vec![
            SceneNode::camera(config.camera_position, config.camera_fov),
            SceneNode::light_cube(),
            SceneNode::point_light(config.light_intensity, config.light_range),
        ];
        for (index, text) in config.texts.iter().enumerate() {
            nodes.push(SceneNode::text(index, text));
        }
        Self { nodes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_assembles_five_nodes() {
        let scene = Scene::from_config(&SceneConfig::default());
        assert_eq!(scene.nodes.len(), 5);
        let kinds: Vec<NodeKind> = scene.nodes.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Camera,
                NodeKind::LightCube,
                NodeKind::PointLight,
                NodeKind::Text,
                NodeKind::Text,
            ]
        );
    }

    #[test]
    fn text_nodes_carry_their_finish_and_color() {
        let scene = Scene::from_config(&SceneConfig::default());
        let texts: Vec<&SceneNode> = scene
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Text)
            .collect();
        assert_eq!(texts[0].glyph, Some('i'));
        assert_eq!(texts[0].finish, Some(Finish::Plastic));
        assert_eq!(texts[0].position, Vec3::new(-3.0, 0.0, 0.0));
        assert_eq!(texts[1].glyph, Some('9'));
        assert_eq!(texts[1].finish, Some(Finish::Metal));
    }

    #[test]
    fn light_cube_starts_at_the_origin() {
        let scene = Scene::from_config(&SceneConfig::default());
        let cube = scene
            .nodes
            .iter()
            .find(|n| n.kind == NodeKind::LightCube)
            .unwrap();
        assert_eq!(cube.position, Vec3::ZERO);
        assert_eq!(cube.color, Vec3::ONE);
    }
}
