// inspector.rs - Scene file inspector
// Features: format detection by suffix, tree statistics, JSON summary

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;

use argh::FromArgs;
use serde::Serialize;

use scenemerge::core::check_extension;
use scenemerge::scene::{self, NodeCore, NodeId, SceneGraph};

// ============================================================================
// CLI ARGUMENTS
// ============================================================================

#[derive(FromArgs)]
/// Inspect an .osg or .osb scene file
struct Args {
    /// scene file to inspect
    #[argh(positional)]
    file: String,

    /// print the whole node tree
    #[argh(switch)]
    detailed: bool,

    /// print the summary as JSON
    #[argh(switch)]
    json: bool,

    /// quiet mode - minimal output
    #[argh(switch)]
    quiet: bool,
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Serialize)]
struct SceneSummary {
    file: String,
    format: String,
    file_size: u64,
    node_count: usize,
    depth: usize,
    root_core: Option<String>,
    top_level_children: Vec<String>,
    cores: BTreeMap<String, usize>,
    uncored_nodes: usize,
    vertices: usize,
    indices: usize,
}

fn display_name(graph: &SceneGraph, id: NodeId) -> String {
    graph
        .get(id)
        .and_then(|n| n.name.clone())
        .unwrap_or_else(|| "<unnamed>".to_string())
}

fn summarize(graph: &SceneGraph, root: NodeId, file: &str, format: &str, file_size: u64) -> SceneSummary {
    let mut summary = SceneSummary {
        file: file.to_string(),
        format: format.to_string(),
        file_size,
        node_count: graph.subtree_size(root),
        depth: graph.depth(root),
        root_core: graph
            .get(root)
            .and_then(|n| n.core.as_ref())
            .map(|c| c.kind().to_string()),
        top_level_children: graph
            .children(root)
            .iter()
            .map(|&c| display_name(graph, c))
            .collect(),
        cores: BTreeMap::new(),
        uncored_nodes: 0,
        vertices: 0,
        indices: 0,
    };

    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        stack.extend_from_slice(graph.children(id));
        let Some(node) = graph.get(id) else { continue };
        match &node.core {
            Some(core) => {
                *summary.cores.entry(core.kind().to_string()).or_insert(0) += 1;
                if let NodeCore::Geometry(geometry) = core {
                    summary.vertices += geometry.vertex_count();
                    summary.indices += geometry.indices.len();
                }
            }
            None => summary.uncored_nodes += 1,
        }
    }

    summary
}

fn print_summary(summary: &SceneSummary) {
    println!("\n=== SCENE SUMMARY ===");
    println!("File: {}", summary.file);
    println!("Format: {}", summary.format);
    println!("Size: {} bytes", summary.file_size);
    println!("Nodes: {}", summary.node_count);
    println!("Depth: {}", summary.depth);
    println!(
        "Root core: {}",
        summary.root_core.as_deref().unwrap_or("<none>")
    );

    println!("\n=== TOP-LEVEL CHILDREN ({}) ===", summary.top_level_children.len());
    for (i, name) in summary.top_level_children.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, name);
    }

    println!("\n=== CORES ===");
    for (kind, count) in &summary.cores {
        println!("  {:<14} {}", kind, count);
    }
    if summary.uncored_nodes > 0 {
        println!("  {:<14} {}", "<none>", summary.uncored_nodes);
    }

    if summary.vertices > 0 {
        println!("\n=== GEOMETRY ===");
        println!("Vertices: {}", summary.vertices);
        println!("Indices: {}", summary.indices);
    }
}

fn print_tree(graph: &SceneGraph, id: NodeId, level: usize) {
    let Some(node) = graph.get(id) else { return };
    let core = node.core.as_ref().map(|c| c.kind()).unwrap_or("-");
    let name = node.name.as_deref().unwrap_or("");
    let meta = if node.meta.is_empty() {
        String::new()
    } else {
        format!(" [{} meta]", node.meta.len())
    };
    println!("{}{} {}{}", "  ".repeat(level), core, name, meta);
    for &child in graph.children(id) {
        print_tree(graph, child, level + 1);
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn run(args: &Args) -> Result<(), String> {
    let ext = check_extension(&args.file).map_err(|e| e.to_string())?;
    let file = File::open(&args.file)
        .map_err(|e| format!("Failed to open '{}': {}", args.file, e))?;
    let file_size = file.metadata().map(|m| m.len()).unwrap_or(0);

    let handler = scene::init();
    let mut graph = SceneGraph::new();
    let root = handler
        .read(&mut graph, &mut BufReader::new(file), &ext)
        .ok_or_else(|| format!("Couldn't read a scene from '{}'", args.file))?;

    let format = handler
        .get_type(&ext)
        .map(|t| t.name())
        .unwrap_or("unknown");
    let summary = summarize(&graph, root, &args.file, format, file_size);

    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("Failed to serialize summary: {}", e))?;
        println!("{}", json);
        return Ok(());
    }

    if args.quiet {
        println!("{}: {} nodes, depth {}", summary.file, summary.node_count, summary.depth);
        return Ok(());
    }

    print_summary(&summary);
    if args.detailed {
        println!("\n=== TREE ===");
        print_tree(&graph, root, 0);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Args = argh::from_env();
    if let Err(e) = run(&args) {
        eprintln!("[ERROR]: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenemerge::scene::{Geometry, SceneTree};

    #[test]
    fn test_summarize_counts_cores() {
        let tree = SceneTree::group()
            .with_child(SceneTree::default().with_name("a").with_core(NodeCore::Geometry(
                Geometry {
                    positions: vec![[0.0; 3]; 3],
                    indices: vec![0, 1, 2],
                    ..Geometry::default()
                },
            )))
            .with_child(SceneTree::default());

        let mut graph = SceneGraph::new();
        let root = graph.insert_tree(tree);
        let summary = summarize(&graph, root, "x.osb", "OSB", 0);

        assert_eq!(summary.node_count, 3);
        assert_eq!(summary.depth, 2);
        assert_eq!(summary.root_core.as_deref(), Some("Group"));
        assert_eq!(summary.top_level_children, vec!["a", "<unnamed>"]);
        assert_eq!(summary.cores.get("Geometry"), Some(&1));
        assert_eq!(summary.uncored_nodes, 1);
        assert_eq!(summary.vertices, 3);
        assert_eq!(summary.indices, 3);
    }
}
