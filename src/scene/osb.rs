// osb.rs - Binary scene format (.osb)
//
// Layout (little-endian):
//   magic        4 bytes  "OSB\x01"
//   version      u16
//   flags        u8       bit 0 = LZ4 payload
//   crc32        u32      checksum of the stored payload
//   payload_len  u64
//   payload      bincode(Vec<FlatNode>), optionally lz4 (size prepended)
//
// Nodes are stored in pre-order, each carrying its child count, so decoding
// never recurses and nesting is checked while the tree is rebuilt.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use super::node::{NodeCore, SceneTree, MAX_NESTING};
use super::traits::SceneFileType;

pub const OSB_MAGIC: [u8; 4] = *b"OSB\x01";
pub const OSB_VERSION: u16 = 1;
pub const FLAG_LZ4: u8 = 0b0000_0001;

const HEADER_LEN: usize = 4 + 2 + 1 + 4 + 8;

/// Binary scene format
#[derive(Debug, Clone)]
pub struct OsbFileType;

/// One node of the pre-order payload
#[derive(Debug, Serialize, Deserialize)]
struct FlatNode {
    name: Option<String>,
    core: Option<NodeCore>,
    meta: BTreeMap<String, String>,
    child_count: u32,
}

/// Header fields as found on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsbHeader {
    pub version: u16,
    pub flags: u8,
    pub crc32: u32,
    pub payload_len: u64,
}

impl OsbHeader {
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_LZ4 != 0
    }

    fn to_bytes(self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&OSB_MAGIC);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6] = self.flags;
        bytes[7..11].copy_from_slice(&self.crc32.to_le_bytes());
        bytes[11..19].copy_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    /// Parse and sanity-check a header
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() < HEADER_LEN {
            return Err(format!(
                "Binary scene truncated: {} bytes, header needs {}",
                bytes.len(),
                HEADER_LEN
            ));
        }
        if bytes[0..4] != OSB_MAGIC {
            return Err("Not a binary scene file (bad magic)".to_string());
        }

        let header = Self {
            version: u16::from_le_bytes([bytes[4], bytes[5]]),
            flags: bytes[6],
            crc32: u32::from_le_bytes([bytes[7], bytes[8], bytes[9], bytes[10]]),
            payload_len: u64::from_le_bytes([
                bytes[11], bytes[12], bytes[13], bytes[14], bytes[15], bytes[16], bytes[17],
                bytes[18],
            ]),
        };

        if header.version != OSB_VERSION {
            return Err(format!(
                "Unsupported binary scene version {} (expected {})",
                header.version, OSB_VERSION
            ));
        }
        if header.flags & !FLAG_LZ4 != 0 {
            return Err(format!("Unknown binary scene flags 0x{:02x}", header.flags));
        }
        Ok(header)
    }
}

impl SceneFileType for OsbFileType {
    fn suffixes(&self) -> &'static [&'static str] {
        &["osb"]
    }

    fn name(&self) -> &'static str {
        "OSB"
    }

    fn description(&self) -> &'static str {
        "Binary scene format (bincode payload, optional LZ4, CRC32 checked)"
    }

    fn read(&self, input: &mut dyn Read) -> Result<SceneTree, String> {
        let mut data = Vec::new();
        input
            .read_to_end(&mut data)
            .map_err(|e| format!("Failed to read binary scene: {}", e))?;
        decode_scene(&data)
    }

    fn write(&self, tree: &SceneTree, output: &mut dyn Write, compress: bool) -> Result<(), String> {
        let data = encode_scene(tree, compress)?;
        output
            .write_all(&data)
            .map_err(|e| format!("Write error: {}", e))
    }
}

fn flatten_tree(tree: &SceneTree) -> Result<Vec<FlatNode>, String> {
    let mut nodes = Vec::new();
    let mut stack = vec![tree];
    while let Some(node) = stack.pop() {
        let child_count = u32::try_from(node.children.len())
            .map_err(|_| format!("Node has too many children ({})", node.children.len()))?;
        nodes.push(FlatNode {
            name: node.name.clone(),
            core: node.core.clone(),
            meta: node.meta.clone(),
            child_count,
        });
        stack.extend(node.children.iter().rev());
    }
    Ok(nodes)
}

fn rebuild_tree(nodes: Vec<FlatNode>) -> Result<SceneTree, String> {
    let total = nodes.len();
    let mut nodes = nodes.into_iter();
    let mut open: Vec<(SceneTree, u32)> = Vec::new();

    let root = nodes.next().ok_or("Binary scene contains no nodes")?;
    open.push(unflatten(root));

    while let Some((tree, remaining)) = open.pop() {
        if remaining == 0 {
            match open.last_mut() {
                Some((parent, parent_remaining)) => {
                    parent.children.push(tree);
                    *parent_remaining -= 1;
                }
                None => {
                    let trailing = nodes.len();
                    if trailing > 0 {
                        return Err(format!(
                            "Binary scene has {} trailing nodes after the root",
                            trailing
                        ));
                    }
                    return Ok(tree);
                }
            }
            continue;
        }

        open.push((tree, remaining));
        if open.len() >= MAX_NESTING {
            return Err(format!(
                "Binary scene nested deeper than {} levels",
                MAX_NESTING
            ));
        }
        let next = nodes
            .next()
            .ok_or_else(|| format!("Binary scene truncated after {} nodes", total))?;
        open.push(unflatten(next));
    }

    Err("Binary scene contains no nodes".to_string())
}

fn unflatten(node: FlatNode) -> (SceneTree, u32) {
    let tree = SceneTree {
        name: node.name,
        core: node.core,
        meta: node.meta,
        children: Vec::with_capacity(node.child_count.min(1024) as usize),
    };
    (tree, node.child_count)
}

/// Wrap an already serialized payload with the file header
fn frame_payload(serialized: Vec<u8>, compress: bool) -> Vec<u8> {
    let (payload, flags) = if compress {
        (lz4_flex::compress_prepend_size(&serialized), FLAG_LZ4)
    } else {
        (serialized, 0)
    };

    let header = OsbHeader {
        version: OSB_VERSION,
        flags,
        crc32: crc32fast::hash(&payload),
        payload_len: payload.len() as u64,
    };

    let mut data = Vec::with_capacity(HEADER_LEN + payload.len());
    data.extend_from_slice(&header.to_bytes());
    data.extend_from_slice(&payload);
    data
}

/// Encode a scene into a complete binary file image
pub fn encode_scene(tree: &SceneTree, compress: bool) -> Result<Vec<u8>, String> {
    let nodes = flatten_tree(tree)?;
    let serialized =
        bincode::serialize(&nodes).map_err(|e| format!("Failed to serialize scene: {}", e))?;
    let data = frame_payload(serialized, compress);

    log::debug!(
        "Encoded binary scene: {} nodes, {} bytes{}",
        nodes.len(),
        data.len(),
        if compress { " (lz4)" } else { "" }
    );
    Ok(data)
}

/// Decode a complete binary file image
pub fn decode_scene(data: &[u8]) -> Result<SceneTree, String> {
    let header = OsbHeader::from_bytes(data)?;
    let payload = &data[HEADER_LEN..];

    if payload.len() as u64 != header.payload_len {
        return Err(format!(
            "Binary scene payload is {} bytes, header says {}",
            payload.len(),
            header.payload_len
        ));
    }

    let crc = crc32fast::hash(payload);
    if crc != header.crc32 {
        return Err(format!(
            "Binary scene checksum mismatch (stored {:08x}, computed {:08x})",
            header.crc32, crc
        ));
    }

    let decompressed;
    let serialized = if header.is_compressed() {
        decompressed = lz4_flex::decompress_size_prepended(payload)
            .map_err(|e| format!("LZ4 decompression failed: {}", e))?;
        &decompressed[..]
    } else {
        payload
    };

    let nodes: Vec<FlatNode> =
        bincode::deserialize(serialized).map_err(|e| format!("Failed to decode scene: {}", e))?;
    rebuild_tree(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::node::{Geometry, IDENTITY_MATRIX};

    fn sample_tree() -> SceneTree {
        SceneTree::group()
            .with_name("root")
            .with_child(SceneTree::default().with_core(NodeCore::Transform {
                matrix: IDENTITY_MATRIX,
            }))
            .with_child(SceneTree::default().with_core(NodeCore::Geometry(Geometry {
                positions: vec![[0.0; 3]; 64],
                indices: vec![0; 96],
                ..Geometry::default()
            })))
    }

    #[test]
    fn test_plain_and_compressed_decode() {
        let tree = sample_tree();

        let plain = encode_scene(&tree, false).unwrap();
        let packed = encode_scene(&tree, true).unwrap();

        assert_eq!(&plain[0..4], &OSB_MAGIC);
        assert!(!OsbHeader::from_bytes(&plain).unwrap().is_compressed());
        assert!(OsbHeader::from_bytes(&packed).unwrap().is_compressed());
        assert!(packed.len() < plain.len());

        assert_eq!(decode_scene(&plain).unwrap(), tree);
        assert_eq!(decode_scene(&packed).unwrap(), tree);
    }

    #[test]
    fn test_detects_corruption() {
        let mut data = encode_scene(&sample_tree(), false).unwrap();
        let last = data.len() - 1;
        data[last] ^= 0xff;

        let err = decode_scene(&data).unwrap_err();
        assert!(err.contains("checksum"), "{}", err);
    }

    #[test]
    fn test_rejects_bad_headers() {
        let data = encode_scene(&sample_tree(), false).unwrap();

        assert!(decode_scene(&data[..10]).is_err(), "truncated header");
        assert!(decode_scene(&data[..data.len() - 1]).is_err(), "truncated payload");
        assert!(decode_scene(b"#OSG V1.0\nNode { }\n").is_err(), "text file");

        let mut wrong_version = data.clone();
        wrong_version[4] = 9;
        assert!(decode_scene(&wrong_version).is_err());

        let mut wrong_flags = data;
        wrong_flags[6] = 0x80;
        assert!(decode_scene(&wrong_flags).is_err());
    }

    fn chain_payload(levels: usize) -> Vec<u8> {
        let nodes: Vec<FlatNode> = (0..levels)
            .map(|i| FlatNode {
                name: None,
                core: Some(NodeCore::Group),
                meta: BTreeMap::new(),
                child_count: if i + 1 < levels { 1 } else { 0 },
            })
            .collect();
        frame_payload(bincode::serialize(&nodes).unwrap(), false)
    }

    #[test]
    fn test_nesting_limit() {
        let tree = decode_scene(&chain_payload(MAX_NESTING)).unwrap();
        assert_eq!(tree.depth(), MAX_NESTING);

        let err = decode_scene(&chain_payload(MAX_NESTING + 1)).unwrap_err();
        assert!(err.contains("nested deeper"), "{}", err);
    }

    #[test]
    fn test_very_deep_payload_is_rejected() {
        let err = decode_scene(&chain_payload(100_000)).unwrap_err();
        assert!(err.contains("nested deeper"), "{}", err);
    }

    #[test]
    fn test_rejects_inconsistent_child_counts() {
        let mut nodes = vec![
            FlatNode {
                name: None,
                core: Some(NodeCore::Group),
                meta: BTreeMap::new(),
                child_count: 2,
            },
            FlatNode {
                name: None,
                core: None,
                meta: BTreeMap::new(),
                child_count: 0,
            },
        ];
        let truncated = frame_payload(bincode::serialize(&nodes).unwrap(), false);
        let err = decode_scene(&truncated).unwrap_err();
        assert!(err.contains("truncated"), "{}", err);

        nodes[0].child_count = 0;
        let trailing = frame_payload(bincode::serialize(&nodes).unwrap(), false);
        let err = decode_scene(&trailing).unwrap_err();
        assert!(err.contains("trailing"), "{}", err);

        let empty = frame_payload(bincode::serialize(&Vec::<FlatNode>::new()).unwrap(), false);
        assert!(decode_scene(&empty).is_err());
    }

    #[test]
    fn test_file_type_through_trait() {
        let file_type = OsbFileType;
        let mut buffer = Vec::new();
        file_type.write(&sample_tree(), &mut buffer, true).unwrap();

        let tree = file_type.read(&mut buffer.as_slice()).unwrap();
        assert_eq!(tree, sample_tree());
    }
}
