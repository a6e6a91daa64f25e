// lib.rs - scenemerge library root

//! # scenemerge - Merge scene files under a single group node
//!
//! Loads any number of `.osg` (text) and `.osb` (binary) scene files, hangs
//! every root that loads under one synthetic `Group` node and writes the
//! result as a single binary scene.
//!
//! ## Features
//!
//! - **Forgiving**: unreadable or unknown inputs are reported and skipped
//! - **Order preserving**: loaded scenes keep their command-line order
//! - **Pluggable formats**: register extra [`scene::SceneFileType`]s on the handler
//! - **Compact output**: optional LZ4 payload, CRC32 checked
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use scenemerge::prelude::*;
//!
//! let handler = scenemerge::scene::init();
//! let options = MergeOptions {
//!     output: "merged.osb".to_string(),
//!     inputs: vec!["a.osg".to_string(), "b.osb".to_string()],
//!     compress: false,
//!     root_name: None,
//! };
//! let report = run_merge(&handler, &options)?;
//! println!("{} loaded, {} skipped", report.loaded.len(), report.failed.len());
//! # Ok::<(), MergeError>(())
//! ```

// Re-export all main modules
pub mod cli;
pub mod core;
pub mod error;
pub mod output;
pub mod scene;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::core::{load_file, merge_files, run_merge, MergeOptions, MergeReport};
    pub use crate::error::MergeError;
    pub use crate::output::write_output;
    pub use crate::scene::{NodeCore, NodeId, SceneFileHandler, SceneGraph, SceneTree};
}

// Re-export main types at the root level for convenience
pub use crate::core::{MergeOptions, MergeReport};
pub use error::MergeError;
pub use scene::{SceneFileHandler, SceneGraph};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!("scenemerge v{} - Scene file merger", VERSION)
}
