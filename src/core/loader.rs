// loader.rs - Load one input scene file

use std::fs::File;
use std::io::BufReader;

use crate::core::extension::check_extension;
use crate::error::MergeError;
use crate::scene::{NodeId, SceneFileHandler, SceneGraph};

/// Open `path`, check its extension and hand the stream to the scene file
/// handler. The returned node is detached; the caller decides where it goes.
pub fn load_file(
    handler: &SceneFileHandler,
    graph: &mut SceneGraph,
    path: &str,
) -> Result<NodeId, MergeError> {
    let file = File::open(path).map_err(|source| MergeError::Open {
        path: path.to_string(),
        source,
    })?;

    let ext = check_extension(path)?;

    let mut reader = BufReader::new(file);
    let node = handler
        .read(graph, &mut reader, &ext)
        .ok_or_else(|| MergeError::Parse(path.to_string()))?;

    log::debug!(
        "Loaded '{}' ({} nodes)",
        path,
        graph.subtree_size(node)
    );
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SCENE: &str = "#OSG V1.0\nNode { name \"cube\" core Group { } }\n";

    #[test]
    fn test_load_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.OSG");
        fs::write(&path, SCENE).unwrap();

        let handler = crate::scene::init();
        let mut graph = SceneGraph::new();
        let node = load_file(&handler, &mut graph, path.to_str().unwrap()).unwrap();

        assert_eq!(graph.get(node).unwrap().name.as_deref(), Some("cube"));
    }

    #[test]
    fn test_open_error_comes_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");

        let handler = crate::scene::init();
        let mut graph = SceneGraph::new();
        let err = load_file(&handler, &mut graph, path.to_str().unwrap()).unwrap_err();

        assert!(matches!(err, MergeError::Open { .. }));
    }

    #[test]
    fn test_extension_rechecked_after_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.txt");
        fs::write(&path, SCENE).unwrap();

        let handler = crate::scene::init();
        let mut graph = SceneGraph::new();
        let err = load_file(&handler, &mut graph, path.to_str().unwrap()).unwrap_err();

        assert!(matches!(err, MergeError::UnknownExtension(ext) if ext == "txt"));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_unparseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.osb");
        fs::write(&path, SCENE).unwrap();

        let handler = crate::scene::init();
        let mut graph = SceneGraph::new();
        let err = load_file(&handler, &mut graph, path.to_str().unwrap()).unwrap_err();

        assert!(matches!(err, MergeError::Parse(p) if p.ends_with("broken.osb")));
    }
}
