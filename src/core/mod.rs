// mod.rs - Merge orchestration

pub mod assembler;
pub mod extension;
pub mod loader;

// Re-export main types for convenience
pub use assembler::{merge_files, MergeReport};
pub use extension::{check_extension, get_extension, ALLOWED_EXTENSIONS};
pub use loader::load_file;

use crate::error::MergeError;
use crate::output::write_output;
use crate::scene::{SceneFileHandler, SceneGraph};

/// Everything a merge run needs once the command line has been validated
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOptions {
    pub output: String,
    pub inputs: Vec<String>,
    pub compress: bool,
    pub root_name: Option<String>,
}

/// Load every input under a group root and write the result.
/// Only an unwritable output makes this fail.
pub fn run_merge(
    handler: &SceneFileHandler,
    options: &MergeOptions,
) -> Result<MergeReport, MergeError> {
    let mut graph = SceneGraph::new();
    let report = merge_files(
        handler,
        &mut graph,
        &options.inputs,
        options.root_name.as_deref(),
    );

    println!("[INFO]: Write output file...");
    write_output(
        handler,
        &graph,
        report.root,
        &options.output,
        options.compress,
    )?;

    Ok(report)
}
