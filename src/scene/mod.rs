// mod.rs - Scene graph and scene file formats

pub mod node;
pub mod osb;
pub mod osg;
pub mod registry;
pub mod traits;

// Re-export main types for convenience
pub use node::{Geometry, Material, Node, NodeCore, NodeId, SceneGraph, SceneTree, MAX_NESTING};
pub use osb::OsbFileType;
pub use osg::OsgFileType;
pub use registry::SceneFileHandler;
pub use traits::SceneFileType;

/// Set up the scene file capability. Call once at startup and pass the
/// handler to whatever needs to read or write scenes.
pub fn init() -> SceneFileHandler {
    let handler = SceneFileHandler::new();
    log::debug!(
        "Scene file handler ready, formats: {}",
        handler.get_suffixes().join(", ")
    );
    handler
}
