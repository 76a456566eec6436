use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::lighting::Finish;

/// Per-frame translation applied while a movement key is held.
pub const MOVE_SPEED: f32 = 0.1;
/// Per-frame rotation added to the light cube on two axes.
pub const ROTATION_STEP: f32 = 0.01;

/// Configuration for one scene variant.
///
/// The original demo existed as a family of near-identical setups that
/// differed only in whether keyboard input was wired up and whether the
/// shader light position was refreshed each frame. Both switches live
/// here so every observed variant stays reachable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub input_enabled: bool,
    pub refresh_light: bool,
    pub ambient_intensity: f32,
    pub light_intensity: f32,
    pub light_range: f32,
    pub camera_position: Vec3,
    pub camera_fov: f32,
    pub font_path: Option<PathBuf>,
    pub texts: Vec<TextConfig>,
}

/// One extruded glyph mesh to place in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    pub glyph: char,
    pub finish: Finish,
    pub color: Vec3,
    pub position: Vec3,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            input_enabled: true,
            refresh_light: true,
            ambient_intensity: 0.219,
            light_intensity: 1.0,
            light_range: 5.0,
            camera_position: Vec3::new(0.0, 0.0, 10.0),
            camera_fov: 75.0,
            font_path: None,
            texts: vec![
                TextConfig {
                    glyph: 'i',
                    finish: Finish::Plastic,
                    color: Vec3::new(255.0, 127.0, 80.0) / 255.0,
                    position: Vec3::new(-3.0, 0.0, 0.0),
                },
                TextConfig {
                    glyph: '9',
                    finish: Finish::Metal,
                    color: Vec3::new(0.0, 128.0, 175.0) / 255.0,
                    position: Vec3::new(3.0, 0.0, 0.0),
                },
            ],
        }
    }
}

impl SceneConfig {
    /// Parses a scene configuration from the XML variant files.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let root = document.root_element();
        if !root.has_tag_name("scene") {
            return Err(anyhow!("expected a <scene> root element"));
        }

        let defaults = Self::default();
        let mut config = Self {
            texts: Vec::new(),
            ..defaults
        };

        config.input_enabled =
            parse_bool(optional_text(&root, "input"), config.input_enabled)?;
        config.refresh_light =
            parse_bool(optional_text(&root, "refresh-light"), config.refresh_light)?;
        config.ambient_intensity =
            parse_f32(optional_text(&root, "ambient"), config.ambient_intensity)?;
        config.font_path = optional_text(&root, "font").map(PathBuf::from);

        if let Some(camera) = child_element(&root, "camera") {
            config.camera_position =
                parse_vec3(optional_text(&camera, "position"), config.camera_position)?;
            config.camera_fov = parse_f32(optional_text(&camera, "fov"), config.camera_fov)?;
        }
        if let Some(light) = child_element(&root, "light") {
            config.light_intensity =
                parse_f32(optional_text(&light, "intensity"), config.light_intensity)?;
            config.light_range = parse_f32(optional_text(&light, "range"), config.light_range)?;
        }

        for node in root.children().filter(|n| n.has_tag_name("text")) {
            config.texts.push(parse_text(&node)?);
        }
        if config.texts.is_empty() {
            config.texts = Self::default().texts;
        }

        Ok(config)
    }
}

fn parse_text(node: &Node<'_, '_>) -> Result<TextConfig> {
    let glyph_text = required_text(node, "glyph")?;
    let mut chars = glyph_text.chars();
    let glyph = chars
        .next()
        .ok_or_else(|| anyhow!("<glyph> tag is empty"))?;
    if chars.next().is_some() {
        return Err(anyhow!("<glyph> must contain a single character"));
    }

    let finish_name = optional_text(node, "finish").unwrap_or_else(|| "plastic".to_string());
    let finish = Finish::from_name(&finish_name)
        .ok_or_else(|| anyhow!("unknown finish {finish_name:?}, expected plastic or metal"))?;

    Ok(TextConfig {
        glyph,
        finish,
        color: parse_color(optional_text(node, "color"), Vec3::ONE)?,
        position: parse_vec3(optional_text(node, "position"), Vec3::ZERO)?,
    })
}

fn child_element<'a, 'input>(
    node: &Node<'a, 'input>,
    tag: &str,
) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let mut numbers = value
        .split_whitespace()
        .filter_map(|component| component.parse::<f32>().ok());
    let x = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    let y = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    let z = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    Ok(Vec3::new(x, y, z))
}

fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let raw = parse_vec3(value, default * 255.0)?;
    Ok(raw / 255.0)
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref() {
        None => Ok(default),
        Some("true") | Some("enabled") | Some("on") => Ok(true),
        Some("false") | Some("disabled") | Some("off") => Ok(false),
        Some(other) => Err(anyhow!("expected a boolean, found {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    <scene>
        <input>disabled</input>
        <refresh-light>false</refresh-light>
        <ambient>0.3</ambient>
        <font>assets/helvetiker.ttf</font>
        <camera>
            <position>0 1 12</position>
            <fov>60</fov>
        </camera>
        <light>
            <intensity>2</intensity>
            <range>8</range>
        </light>
        <text>
            <glyph>q</glyph>
            <finish>metal</finish>
            <color>0 255 0</color>
            <position>-2 0 0</position>
        </text>
    </scene>
    "#;

    #[test]
    fn default_matches_the_original_demo() {
        let config = SceneConfig::default();
        assert!(config.input_enabled);
        assert!(config.refresh_light);
        assert!((config.ambient_intensity - 0.219).abs() < f32::EPSILON);
        assert_eq!(config.camera_position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(config.texts.len(), 2);
        assert_eq!(config.texts[0].glyph, 'i');
        assert_eq!(config.texts[0].finish, Finish::Plastic);
        assert_eq!(config.texts[1].glyph, '9');
        assert_eq!(config.texts[1].finish, Finish::Metal);
    }

    #[test]
    fn parse_full_variant() {
        let config = SceneConfig::from_xml(SAMPLE).unwrap();
        assert!(!config.input_enabled);
        assert!(!config.refresh_light);
        assert!((config.ambient_intensity - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.camera_fov, 60.0);
        assert_eq!(config.light_range, 8.0);
        assert_eq!(
            config.font_path.as_deref(),
            Some(std::path::Path::new("assets/helvetiker.ttf"))
        );
        assert_eq!(config.texts.len(), 1);
        assert_eq!(config.texts[0].glyph, 'q');
        assert_eq!(config.texts[0].finish, Finish::Metal);
        assert_eq!(config.texts[0].color, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn empty_scene_falls_back_to_default_texts() {
        let config = SceneConfig::from_xml("<scene></scene>").unwrap();
        assert_eq!(config.texts, SceneConfig::default().texts);
    }

    #[test]
    fn multi_character_glyph_is_an_error() {
        let bad = "<scene><text><glyph>hi</glyph></text></scene>";
        assert!(SceneConfig::from_xml(bad).is_err());
    }

    #[test]
    fn unknown_finish_is_an_error() {
        let bad = "<scene><text><glyph>x</glyph><finish>wood</finish></text></scene>";
        assert!(SceneConfig::from_xml(bad).is_err());
    }
}
