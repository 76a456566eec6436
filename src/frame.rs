use glam::Vec3;

use crate::config::{SceneConfig, MOVE_SPEED, ROTATION_STEP};
use crate::data_model::SceneGraph;
use crate::input::MovementFlags;
use crate::scene::NodeKind;

/// Mutable state carried across frames that is not part of the scene
/// graph: the light position as the shaders will see it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameState {
    /// World-space light position last published to the shaders. Stays at
    /// the origin forever when `refresh_light` is disabled, reproducing
    /// the variants that never updated the uniform.
    pub shader_light: Vec3,
}

/// Advances the scene by one frame.
///
/// Order matters and matches the render loop contract: input-driven
/// movement first, then the fixed rotation step, then the light-position
/// copy. The value left in `state.shader_light` is therefore the cube's
/// position as of the end of this frame's input handling, which the
/// renderer consumes before the draw call (at most one frame of
/// staleness, never a torn value).
pub fn advance_frame(
    graph: &SceneGraph,
    config: &SceneConfig,
    flags: MovementFlags,
    state: &mut FrameState,
) {
    let flags = if config.input_enabled {
        flags
    } else {
        MovementFlags::default()
    };

    let mut cube_position = Vec3::ZERO;
    graph.update_kind(NodeKind::LightCube, |cube| {
        if flags.cube_up {
            cube.position.y += MOVE_SPEED;
        }
        if flags.cube_down {
            cube.position.y -= MOVE_SPEED;
        }
        cube.rotation.x += ROTATION_STEP;
        cube.rotation.y += ROTATION_STEP;
        cube_position = cube.position;
    });

    graph.update_kind(NodeKind::Camera, |camera| {
        if flags.camera_left {
            camera.position.x -= MOVE_SPEED;
        }
        if flags.camera_right {
            camera.position.x += MOVE_SPEED;
        }
    });

    // The point light is parented to the cube.
    graph.update_kind(NodeKind::PointLight, |light| {
        light.position = cube_position;
    });

    if config.refresh_light {
        state.shader_light = cube_position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    fn setup(config: &SceneConfig) -> (SceneGraph, FrameState) {
        (
            SceneGraph::from_scene(Scene::from_config(config)),
            FrameState::default(),
        )
    }

    fn held(cube_up: bool) -> MovementFlags {
        MovementFlags {
            cube_up,
            ..MovementFlags::default()
        }
    }

    #[test]
    fn holding_a_key_for_n_frames_moves_exactly_n_steps() {
        let config = SceneConfig::default();
        let (graph, mut state) = setup(&config);
        for _ in 0..7 {
            advance_frame(&graph, &config, held(true), &mut state);
        }
        let cube = graph.first_of_kind(NodeKind::LightCube).unwrap();
        assert!((cube.position.y - 0.7).abs() < 1e-6);

        // Releasing the key freezes the position.
        for _ in 0..5 {
            advance_frame(&graph, &config, held(false), &mut state);
        }
        let cube = graph.first_of_kind(NodeKind::LightCube).unwrap();
        assert!((cube.position.y - 0.7).abs() < 1e-6);
    }

    #[test]
    fn camera_moves_along_x() {
        let config = SceneConfig::default();
        let (graph, mut state) = setup(&config);
        let flags = MovementFlags {
            camera_left: true,
            ..MovementFlags::default()
        };
        for _ in 0..3 {
            advance_frame(&graph, &config, flags, &mut state);
        }
        let camera = graph.first_of_kind(NodeKind::Camera).unwrap();
        assert!((camera.position.x - (-0.3)).abs() < 1e-6);
    }

    #[test]
    fn rotation_advances_every_frame() {
        let config = SceneConfig::default();
        let (graph, mut state) = setup(&config);
        for _ in 0..10 {
            advance_frame(&graph, &config, MovementFlags::default(), &mut state);
        }
        let cube = graph.first_of_kind(NodeKind::LightCube).unwrap();
        assert!((cube.rotation.x - 0.1).abs() < 1e-6);
        assert!((cube.rotation.y - 0.1).abs() < 1e-6);
        assert_eq!(cube.rotation.z, 0.0);
    }

    #[test]
    fn shader_light_tracks_the_cube_within_the_frame() {
        let config = SceneConfig::default();
        let (graph, mut state) = setup(&config);
        advance_frame(&graph, &config, held(true), &mut state);
        let cube = graph.first_of_kind(NodeKind::LightCube).unwrap();
        assert_eq!(state.shader_light, cube.position);
    }

    #[test]
    fn point_light_stays_parented_to_the_cube() {
        let config = SceneConfig::default();
        let (graph, mut state) = setup(&config);
        for _ in 0..4 {
            advance_frame(&graph, &config, held(true), &mut state);
        }
        let cube = graph.first_of_kind(NodeKind::LightCube).unwrap();
        let light = graph.first_of_kind(NodeKind::PointLight).unwrap();
        assert_eq!(light.position, cube.position);
    }

    #[test]
    fn disabled_refresh_keeps_the_shader_light_at_the_origin() {
        let config = SceneConfig {
            refresh_light: false,
            ..SceneConfig::default()
        };
        let (graph, mut state) = setup(&config);
        for _ in 0..6 {
            advance_frame(&graph, &config, held(true), &mut state);
        }
        let cube = graph.first_of_kind(NodeKind::LightCube).unwrap();
        assert!(cube.position.y > 0.5);
        assert_eq!(state.shader_light, Vec3::ZERO);
    }

    #[test]
    fn disabled_input_ignores_movement_flags() {
        let config = SceneConfig {
            input_enabled: false,
            ..SceneConfig::default()
        };
        let (graph, mut state) = setup(&config);
        advance_frame(&graph, &config, held(true), &mut state);
        let cube = graph.first_of_kind(NodeKind::LightCube).unwrap();
        assert_eq!(cube.position.y, 0.0);
        // Rotation is unconditional.
        assert!((cube.rotation.x - ROTATION_STEP).abs() < 1e-6);
    }
}
