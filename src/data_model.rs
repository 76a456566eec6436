use std::sync::Arc;

use glam::Vec3;
use parking_lot::RwLock;

use crate::scene::{NodeKind, Scene, SceneNode};

/// Thread-safe container mirroring the mutable state of the scene graph.
///
/// All per-frame mutation happens through this handle; renderers and the
/// headless path read consistent snapshots out of it.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Arc<RwLock<Vec<SceneNode>>>,
}

impl Clone for SceneGraph {
    fn clone(&self) -> Self {
        Self {
            nodes: Arc::clone(&self.nodes),
        }
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph from an assembled scene.
    pub fn from_scene(scene: Scene) -> Self {
        Self {
            nodes: Arc::new(RwLock::new(scene.nodes)),
        }
    }

    /// Returns a snapshot of all stored nodes.
    pub fn all_nodes(&self) -> Vec<SceneNode> {
        self.nodes.read().clone()
    }

    /// Returns a clone of the requested node.
    pub fn get(&self, name: &str) -> Option<SceneNode> {
        self.nodes
            .read()
            .iter()
            .find(|node| node.name == name)
            .cloned()
    }

    /// Returns a clone of the first node of the requested kind.
    pub fn first_of_kind(&self, kind: NodeKind) -> Option<SceneNode> {
        self.nodes
            .read()
            .iter()
            .find(|node| node.kind == kind)
            .cloned()
    }

    /// Applies a mutation to the requested node.
    pub fn update<F, R>(&self, name: &str, mut updater: F) -> Option<R>
    where
        F: FnMut(&mut SceneNode) -> R,
    {
        let mut guard = self.nodes.write();
        let node = guard.iter_mut().find(|node| node.name == name)?;
        Some(updater(node))
    }

    /// Applies a mutation to the first node of the requested kind.
    pub fn update_kind<F, R>(&self, kind: NodeKind, mut updater: F) -> Option<R>
    where
        F: FnMut(&mut SceneNode) -> R,
    {
        let mut guard = self.nodes.write();
        let node = guard.iter_mut().find(|node| node.kind == kind)?;
        Some(updater(node))
    }

    pub fn set_position(&self, name: &str, position: Vec3) -> bool {
        self.update(name, |node| node.position = position).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    fn graph() -> SceneGraph {
        SceneGraph::from_scene(Scene::from_config(&SceneConfig::default()))
    }

    #[test]
    fn get_and_set_position() {
        let graph = graph();
        assert!(graph.set_position("LightCube", Vec3::new(0.0, 2.0, 0.0)));
        let cube = graph.get("LightCube").unwrap();
        assert_eq!(cube.position, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn update_returns_none_for_missing_node() {
        let graph = graph();
        assert!(graph.update("Unknown", |_| ()).is_none());
        assert!(!graph.set_position("Unknown", Vec3::ONE));
    }

    #[test]
    fn first_of_kind_finds_the_camera() {
        let graph = graph();
        let camera = graph.first_of_kind(NodeKind::Camera).unwrap();
        assert_eq!(camera.name, "Camera");
    }

    #[test]
    fn clones_share_state() {
        let graph = graph();
        let alias = graph.clone();
        alias.set_position("LightCube", Vec3::splat(4.0));
        assert_eq!(graph.get("LightCube").unwrap().position, Vec3::splat(4.0));
    }
}
