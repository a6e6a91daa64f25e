// registry.rs - Scene file handler dispatching on file suffixes

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::Arc;

use super::node::{NodeId, SceneGraph};
use super::traits::SceneFileType;
use super::{OsbFileType, OsgFileType};

/// Registry of scene file formats keyed by lower-case suffix
pub struct SceneFileHandler {
    types: HashMap<String, Arc<dyn SceneFileType>>,
}

impl SceneFileHandler {
    pub fn new() -> Self {
        let mut handler = Self {
            types: HashMap::new(),
        };

        // Register built-in formats
        handler.register_type(Box::new(OsgFileType));
        handler.register_type(Box::new(OsbFileType));

        handler
    }

    /// Register a format under every suffix it declares
    pub fn register_type(&mut self, file_type: Box<dyn SceneFileType>) {
        let file_type: Arc<dyn SceneFileType> = file_type.into();
        for suffix in file_type.suffixes() {
            log::debug!("Registering scene file type {} for .{}", file_type.name(), suffix);
            self.types.insert(suffix.to_lowercase(), Arc::clone(&file_type));
        }
    }

    /// Get a format by suffix (case-insensitive)
    pub fn get_type(&self, suffix: &str) -> Option<&dyn SceneFileType> {
        self.types.get(&suffix.to_lowercase()).map(|t| t.as_ref())
    }

    pub fn has_type(&self, suffix: &str) -> bool {
        self.types.contains_key(&suffix.to_lowercase())
    }

    /// List (suffix, name, description) for every registered suffix, sorted by suffix
    pub fn list_types(&self) -> Vec<(&str, &str, &str)> {
        let mut types: Vec<_> = self
            .types
            .iter()
            .map(|(suffix, t)| (suffix.as_str(), t.name(), t.description()))
            .collect();
        types.sort_by(|a, b| a.0.cmp(b.0));
        types
    }

    pub fn get_suffixes(&self) -> Vec<&str> {
        let mut suffixes: Vec<&str> = self.types.keys().map(|s| s.as_str()).collect();
        suffixes.sort_unstable();
        suffixes
    }

    /// Read a scene from `input` with the format registered for `suffix` and
    /// move it into `graph`. Returns `None` if the suffix is unknown or the
    /// data can't be decoded; nothing is added to the graph in that case.
    pub fn read(&self, graph: &mut SceneGraph, input: &mut dyn Read, suffix: &str) -> Option<NodeId> {
        let Some(file_type) = self.get_type(suffix) else {
            log::warn!("No scene file type registered for .{}", suffix);
            return None;
        };

        match file_type.read(input) {
            Ok(tree) => {
                log::debug!(
                    "{} reader decoded {} nodes",
                    file_type.name(),
                    tree.node_count()
                );
                Some(graph.insert_tree(tree))
            }
            Err(e) => {
                log::warn!("{} reader failed: {}", file_type.name(), e);
                None
            }
        }
    }

    /// Write the subtree under `root` to `output` using the format for `suffix`
    pub fn write(
        &self,
        graph: &SceneGraph,
        root: NodeId,
        output: &mut dyn Write,
        suffix: &str,
        compress: bool,
    ) -> Result<(), String> {
        let file_type = self
            .get_type(suffix)
            .ok_or_else(|| format!("No scene file type registered for .{}", suffix))?;
        if graph.get(root).is_none() {
            return Err("Root node does not belong to this scene graph".to_string());
        }

        let tree = graph.to_tree(root);
        file_type.write(&tree, output, compress)
    }
}

impl Default for SceneFileHandler {
    fn default() -> Self {
        Self::new()
    }
}
