use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use log::warn;

use crate::config::SceneConfig;
use crate::data_model::SceneGraph;
use crate::extrude::{extrude, ExtrudeOptions};
use crate::font::LoadedFont;
use crate::frame::{advance_frame, FrameState};
use crate::input::MovementFlags;
use crate::lighting;
use crate::mesh::MeshData;
use crate::render::CameraParams;
use crate::scene::{NodeKind, SceneNode};

/// Derives the camera matrices from the camera node in the snapshot.
pub fn camera_params(nodes: &[SceneNode], aspect: f32) -> CameraParams {
    let default_position = Vec3::new(0.0, 0.0, 10.0);
    let (position, rotation, fov) = nodes
        .iter()
        .find(|node| node.kind == NodeKind::Camera)
        .map(|camera| (camera.position, camera.rotation, camera.fov.unwrap_or(75.0)))
        .unwrap_or((default_position, Vec3::ZERO, 75.0));

    let rotation_matrix = Mat4::from_rotation_z(rotation.z)
        * Mat4::from_rotation_y(rotation.y)
        * Mat4::from_rotation_x(rotation.x);
    let forward = (rotation_matrix * Vec3::new(0.0, 0.0, -1.0).extend(0.0)).truncate();
    let up = (rotation_matrix * Vec3::Y.extend(0.0)).truncate();
    let target = if forward.length_squared() > f32::EPSILON {
        position + forward.normalize()
    } else {
        Vec3::ZERO
    };
    let view = Mat4::look_at_rh(position, target, up);
    let proj = Mat4::perspective_rh(fov.to_radians(), aspect.max(0.01), 0.1, 1000.0);
    CameraParams {
        view,
        proj,
        position,
    }
}

/// The light position the shaders consume this frame, in view space.
pub fn shader_light_view(camera: &CameraParams, state: &FrameState) -> Vec3 {
    lighting::view_space(camera.view, state.shader_light)
}

/// Builds the extruded mesh for every text node from a resolved font.
///
/// A glyph the font cannot provide skips that node with a warning; the
/// rest of the scene is unaffected.
pub fn glyph_meshes(
    font: &LoadedFont,
    nodes: &[SceneNode],
    options: &ExtrudeOptions,
) -> Vec<(String, MeshData)> {
    let mut meshes = Vec::new();
    for node in nodes.iter().filter(|node| node.kind == NodeKind::Text) {
        let Some(glyph) = node.glyph else {
            continue;
        };
        match build_glyph_mesh(font, glyph, options) {
            Ok(mesh) => meshes.push((node.name.clone(), mesh)),
            Err(err) => warn!("skipping glyph {glyph:?} for {}: {err:?}", node.name),
        }
    }
    meshes
}

fn build_glyph_mesh(font: &LoadedFont, glyph: char, options: &ExtrudeOptions) -> Result<MeshData> {
    let outline = font
        .outline(glyph, options.curve_segments)
        .with_context(|| format!("no usable outline for {glyph:?}"))?;
    extrude(&outline, options).with_context(|| format!("failed to extrude {glyph:?}"))
}

/// Runs the frame update for a fixed number of frames with a frozen set
/// of held keys. Used by the headless path and the CLI tests.
pub fn simulate_frames(
    graph: &SceneGraph,
    config: &SceneConfig,
    flags: MovementFlags,
    frames: u32,
    state: &mut FrameState,
) {
    for _ in 0..frames {
        advance_frame(graph, config, flags, state);
    }
}

/// Prints the final scene state in the summary format shared by the
/// interactive shutdown and the headless path.
pub fn print_final_state(graph: &SceneGraph, state: &FrameState) {
    println!("Final node states:");
    for node in graph.all_nodes() {
        println!(
            " - {} pos=({:.2}, {:.2}, {:.2}) rot=({:.2}, {:.2}, {:.2})",
            node.name,
            node.position.x,
            node.position.y,
            node.position.z,
            node.rotation.x,
            node.rotation.y,
            node.rotation.z,
        );
    }
    println!(
        "Shader light position: ({:.2}, {:.2}, {:.2})",
        state.shader_light.x, state.shader_light.y, state.shader_light.z
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    #[test]
    fn camera_looks_down_negative_z_by_default() {
        let scene = Scene::from_config(&SceneConfig::default());
        let camera = camera_params(&scene.nodes, 16.0 / 9.0);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 10.0));
        // The origin lies in front of the camera, 10 units away.
        let origin_view = (camera.view * Vec3::ZERO.extend(1.0)).truncate();
        assert!((origin_view - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-5);
    }

    #[test]
    fn missing_camera_falls_back_to_defaults() {
        let camera = camera_params(&[], 1.0);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn shader_light_is_reported_in_view_space() {
        let scene = Scene::from_config(&SceneConfig::default());
        let camera = camera_params(&scene.nodes, 1.0);
        let state = FrameState {
            shader_light: Vec3::new(0.0, 1.0, 0.0),
        };
        let light = shader_light_view(&camera, &state);
        // Camera sits at z = 10 looking at the origin, so the light lands
        // 10 units down the view axis.
        assert!((light - Vec3::new(0.0, 1.0, -10.0)).length() < 1e-5);
    }

    #[test]
    fn simulation_matches_single_stepping() {
        let config = SceneConfig::default();
        let graph = SceneGraph::from_scene(Scene::from_config(&config));
        let mut state = FrameState::default();
        let flags = MovementFlags {
            cube_up: true,
            ..MovementFlags::default()
        };
        simulate_frames(&graph, &config, flags, 10, &mut state);
        let cube = graph.first_of_kind(NodeKind::LightCube).unwrap();
        assert!((cube.position.y - 1.0).abs() < 1e-6);
        assert_eq!(state.shader_light, cube.position);
    }
}
