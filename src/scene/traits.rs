// traits.rs - Core trait for pluggable scene file formats

use std::fmt::Debug;
use std::io::{Read, Write};

use super::node::SceneTree;

/// A scene file format the handler can dispatch to.
/// Implementations work on owned [`SceneTree`] values so a failed read never
/// leaves half a scene in the graph.
pub trait SceneFileType: Send + Sync + Debug {
    /// Lower-case file suffixes this format answers to
    fn suffixes(&self) -> &'static [&'static str];

    /// Get a human-readable name for this format
    fn name(&self) -> &'static str;

    /// Get a description of this format
    fn description(&self) -> &'static str;

    /// Decode a whole scene from `input`
    fn read(&self, input: &mut dyn Read) -> Result<SceneTree, String>;

    /// Encode `tree` to `output`. `compress` is a hint; formats that can't
    /// compress ignore it.
    fn write(&self, tree: &SceneTree, output: &mut dyn Write, compress: bool)
        -> Result<(), String>;
}
