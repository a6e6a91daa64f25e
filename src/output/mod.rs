// mod.rs - Output writer for the merged scene

use std::fs::{self, File};
use std::io::{BufWriter, Write};

use crate::error::MergeError;
use crate::scene::{NodeId, SceneFileHandler, SceneGraph};

/// Format every output is written in, whatever the output file is called
pub const OUTPUT_FORMAT: &str = "osb";

/// Write the tree under `root` to `file_path` as a binary scene.
/// Parent directories are not created. If writing fails after the file was
/// created, the partial file is removed.
pub fn write_output(
    handler: &SceneFileHandler,
    graph: &SceneGraph,
    root: NodeId,
    file_path: &str,
    compress: bool,
) -> Result<(), MergeError> {
    let file = File::create(file_path).map_err(|source| MergeError::OutputOpen {
        path: file_path.to_string(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    let result = handler
        .write(graph, root, &mut writer, OUTPUT_FORMAT, compress)
        .and_then(|()| writer.flush().map_err(|e| format!("Flush error: {}", e)));

    if let Err(reason) = result {
        drop(writer);
        if let Err(e) = fs::remove_file(file_path) {
            log::warn!("Couldn't remove partial output '{}': {}", file_path, e);
        }
        return Err(MergeError::OutputWrite {
            path: file_path.to_string(),
            reason,
        });
    }

    log::debug!(
        "Wrote {} nodes to '{}'",
        graph.subtree_size(root),
        file_path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::osb::{decode_scene, OSB_MAGIC};

    #[test]
    fn test_output_is_always_binary() {
        let dir = tempfile::tempdir().unwrap();
        // The output is named .osg but still gets binary bytes
        let path = dir.path().join("result.osg");

        let handler = crate::scene::init();
        let mut graph = SceneGraph::new();
        let root = graph.create_group();

        write_output(&handler, &graph, root, path.to_str().unwrap(), false).unwrap();

        let data = fs::read(&path).unwrap();
        assert_eq!(&data[0..4], &OSB_MAGIC);
        let tree = decode_scene(&data).unwrap();
        assert!(tree.children.is_empty());
        assert!(tree.core.unwrap().is_group());
    }

    #[test]
    fn test_unwritable_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.osb");

        let handler = crate::scene::init();
        let mut graph = SceneGraph::new();
        let root = graph.create_group();

        let err = write_output(&handler, &graph, root, path.to_str().unwrap(), false).unwrap_err();
        assert!(matches!(err, MergeError::OutputOpen { .. }));
        assert!(!path.exists());
    }
}
