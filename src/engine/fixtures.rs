//! In-memory assets for tests.

use super::Geometry;
use base64::Engine as _;

pub struct FixtureNode {
    pub name: &'static str,
    pub children: Vec<FixtureNode>,
}

impl FixtureNode {
    pub fn new(name: &'static str, children: Vec<FixtureNode>) -> Self {
        Self { name, children }
    }

    pub fn leaf(name: &'static str) -> Self {
        Self::new(name, Vec::new())
    }
}

pub fn triangle_geometry() -> Geometry {
    Geometry {
        positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        indices: vec![0, 1, 2],
    }
}

/// Three `f32` positions followed by `u16` indices, padded to 44 bytes.
pub fn triangle_buffer() -> Vec<u8> {
    let mut bytes = Vec::with_capacity(44);
    for position in triangle_geometry().positions {
        for value in position {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }
    for index in [0u16, 1, 2] {
        bytes.extend_from_slice(&index.to_le_bytes());
    }
    bytes.resize(44, 0);
    bytes
}

fn push_node(node: &FixtureNode, nodes: &mut Vec<serde_json::Value>) -> usize {
    let index = nodes.len();
    nodes.push(serde_json::Value::Null);
    let children: Vec<usize> = node
        .children
        .iter()
        .map(|child| push_node(child, nodes))
        .collect();
    let mut value = serde_json::json!({ "name": node.name, "mesh": 0 });
    if !children.is_empty() {
        value["children"] = serde_json::json!(children);
    }
    nodes[index] = value;
    index
}

/// A glTF document where every node carries the same one-triangle mesh.
pub fn gltf_data_url(roots: &[FixtureNode]) -> String {
    let mut nodes = Vec::new();
    let root_indices: Vec<usize> = roots.iter().map(|root| push_node(root, &mut nodes)).collect();
    let buffer = triangle_buffer();
    let json = serde_json::json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": root_indices }],
        "nodes": nodes,
        "materials": [{
            "name": "paint",
            "pbrMetallicRoughness": { "baseColorFactor": [0.8, 0.2, 0.2, 1.0] }
        }],
        "meshes": [{
            "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }]
        }],
        "accessors": [
            {
                "bufferView": 0,
                "componentType": 5126,
                "count": 3,
                "type": "VEC3",
                "min": [0.0, 0.0, 0.0],
                "max": [1.0, 1.0, 0.0]
            },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
        ],
        "buffers": [{
            "byteLength": buffer.len(),
            "uri": buffer_uri(&buffer)
        }]
    });
    gltf_json_url(&json)
}

pub fn buffer_uri(bytes: &[u8]) -> String {
    format!(
        "data:application/octet-stream;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

pub fn gltf_json_url(json: &serde_json::Value) -> String {
    format!(
        "data:model/gltf+json;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(json.to_string())
    )
}

/// One triangle per named object.
pub fn obj_data_url(objects: &[&str]) -> String {
    let mut text = String::new();
    for (index, name) in objects.iter().enumerate() {
        let base = index * 3 + 1;
        text.push_str(&format!("o {}\n", name));
        text.push_str("v 0 0 0\nv 1 0 0\nv 0 1 0\n");
        text.push_str(&format!("f {} {} {}\n", base, base + 1, base + 2));
    }
    format!(
        "data:model/obj;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(text)
    )
}
