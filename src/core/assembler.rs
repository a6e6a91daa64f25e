// assembler.rs - Build the merged tree from the input files

use crate::core::loader::load_file;
use crate::error::MergeError;
use crate::scene::{NodeId, SceneFileHandler, SceneGraph};

/// Outcome of loading every input under one synthetic group
#[derive(Debug)]
pub struct MergeReport {
    pub root: NodeId,
    /// Inputs attached to the root, in command-line order
    pub loaded: Vec<String>,
    /// Inputs that were skipped and why
    pub failed: Vec<(String, MergeError)>,
}

impl MergeReport {
    pub fn all_loaded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Create a group root and attach every input that loads. Inputs that fail
/// are reported on stderr and skipped.
pub fn merge_files(
    handler: &SceneFileHandler,
    graph: &mut SceneGraph,
    inputs: &[String],
    root_name: Option<&str>,
) -> MergeReport {
    let root = graph.create_group();
    if let Some(name) = root_name {
        graph.set_name(root, name);
    }

    let mut loaded = Vec::new();
    let mut failed = Vec::new();

    for fname in inputs {
        println!("[INFO]: Read input file {}", fname);

        let attached = load_file(handler, graph, fname).and_then(|node| {
            graph
                .add_child(root, node)
                .map_err(|reason| MergeError::Attach {
                    path: fname.clone(),
                    reason,
                })
        });

        match attached {
            Ok(()) => loaded.push(fname.clone()),
            Err(e) => {
                eprintln!("[ERROR]: Failed to load file '{}' !!! ({})", fname, e);
                failed.push((fname.clone(), e));
            }
        }
    }

    log::info!(
        "Merged {} of {} input files",
        loaded.len(),
        inputs.len()
    );

    MergeReport {
        root,
        loaded,
        failed,
    }
}
