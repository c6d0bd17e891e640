//! Data URL → node hierarchy.
//!
//! Supports glTF (JSON with embedded buffers), GLB and Wavefront OBJ. Loading
//! is pure: the result is plain data that can be produced on a worker thread
//! and instantiated into a [`Scene`](super::Scene) later.

use super::{Geometry, Material, Transform};
use base64::Engine as _;
use glam::{Quat, Vec3};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedNode {
    pub name: String,
    pub transform: Transform,
    pub geometry: Option<Geometry>,
    /// Index into [`ParsedAsset::materials`].
    pub material: Option<usize>,
    pub children: Vec<ParsedNode>,
}

impl ParsedNode {
    fn count(&self) -> usize {
        1 + self.children.iter().map(ParsedNode::count).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAsset {
    pub label: String,
    pub roots: Vec<ParsedNode>,
    pub materials: Vec<Material>,
}

impl ParsedAsset {
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(ParsedNode::count).sum()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("payload is not a data URL")]
    NotDataUrl,
    #[error("data URL payload is not base64 encoded")]
    NotBase64,
    #[error("failed to decode base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unsupported asset format (mime type '{mime}')")]
    UnsupportedFormat { mime: String },
    #[error("failed to parse glTF: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("glTF buffer {index} is missing or external and cannot be resolved from a data URL")]
    UnresolvedBuffer { index: usize },
    #[error("failed to parse OBJ: {0}")]
    Obj(#[from] tobj::LoadError),
    #[error("asset '{label}' contains no nodes")]
    Empty { label: String },
    #[error("glTF node {index} appears more than once in the node hierarchy")]
    NodeCycle { index: usize },
    #[error("glTF mesh {mesh} has more vertices than a 32-bit index can address")]
    IndexOverflow { mesh: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetFormat {
    Gltf,
    Obj,
}

/// Splits `data:<mime>;base64,<payload>` into the mime type and decoded bytes.
pub fn parse_data_url(url: &str) -> Result<(String, Vec<u8>), LoadError> {
    let rest = url.strip_prefix("data:").ok_or(LoadError::NotDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(LoadError::NotDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(LoadError::NotBase64)?;
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    let mime = if mime.is_empty() {
        "text/plain".to_string()
    } else {
        mime.to_string()
    };
    Ok((mime, bytes))
}

pub fn load_data_url(label: &str, url: &str) -> Result<ParsedAsset, LoadError> {
    let (mime, bytes) = parse_data_url(url)?;
    let asset = match sniff_format(&mime, &bytes) {
        Some(AssetFormat::Gltf) => load_gltf(label, &bytes)?,
        Some(AssetFormat::Obj) => load_obj(label, &bytes)?,
        None => return Err(LoadError::UnsupportedFormat { mime }),
    };
    if asset.roots.is_empty() {
        return Err(LoadError::Empty {
            label: label.to_string(),
        });
    }
    log::debug!(
        "Parsed '{}' ({}): {} nodes, {} materials",
        label,
        mime,
        asset.node_count(),
        asset.materials.len()
    );
    Ok(asset)
}

fn sniff_format(mime: &str, bytes: &[u8]) -> Option<AssetFormat> {
    if bytes.starts_with(b"glTF") {
        return Some(AssetFormat::Gltf);
    }
    let first = bytes.iter().find(|byte| !byte.is_ascii_whitespace());
    if first == Some(&b'{') {
        return Some(AssetFormat::Gltf);
    }
    if mime == "model/obj" || looks_like_obj(bytes) {
        return Some(AssetFormat::Obj);
    }
    None
}

fn looks_like_obj(bytes: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return false;
    };
    let mut has_vertex = false;
    let mut has_face = false;
    for line in text.lines().map(str::trim_start) {
        has_vertex |= line.starts_with("v ");
        has_face |= line.starts_with("f ");
        if has_vertex && has_face {
            return true;
        }
    }
    false
}

fn load_gltf(label: &str, bytes: &[u8]) -> Result<ParsedAsset, LoadError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = resolve_buffers(&document, blob)?;

    let materials = document
        .materials()
        .map(|material| {
            let base = material.pbr_metallic_roughness().base_color_factor();
            Material {
                diffuse: [base[0], base[1], base[2]],
                emissive: material.emissive_factor(),
                ..Material::standard(material.name().unwrap_or("material"))
            }
        })
        .collect();

    // Shared across roots: a node reachable twice is a cycle or a shared subtree.
    let mut visited = HashSet::new();
    let roots = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => scene
            .nodes()
            .map(|node| convert_node(&node, &buffers, &mut visited))
            .collect::<Result<Vec<_>, _>>()?,
        None => {
            // No scene: every node that is nobody's child is a root.
            let children: HashSet<usize> = document
                .nodes()
                .flat_map(|node| node.children().map(|child| child.index()))
                .collect();
            document
                .nodes()
                .filter(|node| !children.contains(&node.index()))
                .map(|node| convert_node(&node, &buffers, &mut visited))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(ParsedAsset {
        label: label.to_string(),
        roots,
        materials,
    })
}

fn resolve_buffers(
    document: &gltf::Document,
    blob: Option<Vec<u8>>,
) -> Result<Vec<Vec<u8>>, LoadError> {
    let mut blob = blob;
    let mut buffer_data = Vec::new();
    for buffer in document.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => blob
                .take()
                .ok_or(LoadError::UnresolvedBuffer {
                    index: buffer.index(),
                })?,
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                parse_data_url(uri)?.1
            }
            gltf::buffer::Source::Uri(_) => {
                return Err(LoadError::UnresolvedBuffer {
                    index: buffer.index(),
                })
            }
        };
        buffer_data.push(data);
    }
    Ok(buffer_data)
}

fn convert_node(
    node: &gltf::Node,
    buffers: &[Vec<u8>],
    visited: &mut HashSet<usize>,
) -> Result<ParsedNode, LoadError> {
    if !visited.insert(node.index()) {
        return Err(LoadError::NodeCycle {
            index: node.index(),
        });
    }
    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = Transform {
        translation: Vec3::from(translation),
        rotation: Quat::from_array(rotation),
        scale: Vec3::from(scale),
    };
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()));

    let (geometry, material) = match node.mesh() {
        Some(mesh) => {
            let overflow = || LoadError::IndexOverflow { mesh: mesh.index() };
            let mut geometry = Geometry::default();
            let mut material = None;
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    log::warn!(
                        "Skipping non-triangle primitive in mesh {:?}",
                        mesh.name()
                    );
                    continue;
                }
                let reader =
                    primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                let Some(positions) = reader.read_positions() else {
                    continue;
                };
                let base = u32::try_from(geometry.positions.len()).map_err(|_| overflow())?;
                geometry.positions.extend(positions);
                let end = u32::try_from(geometry.positions.len()).map_err(|_| overflow())?;
                match reader.read_indices() {
                    Some(indices) => {
                        for index in indices.into_u32() {
                            geometry
                                .indices
                                .push(index.checked_add(base).ok_or_else(overflow)?);
                        }
                    }
                    None => geometry.indices.extend(base..end),
                }
                if material.is_none() {
                    material = primitive.material().index();
                }
            }
            (Some(geometry), material)
        }
        None => (None, None),
    };

    let children = node
        .children()
        .map(|child| convert_node(&child, buffers, visited))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ParsedNode {
        name,
        transform,
        geometry,
        material,
        children,
    })
}

fn load_obj(label: &str, bytes: &[u8]) -> Result<ParsedAsset, LoadError> {
    let mut reader = std::io::BufReader::new(bytes);
    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    };
    // Material libraries live next to the file on disk and are not part of the payload.
    let (models, _materials) =
        tobj::load_obj_buf(&mut reader, &options, |_| Err(tobj::LoadError::OpenFileFailed))?;

    let roots = models
        .into_iter()
        .enumerate()
        .map(|(index, model)| {
            let positions = model
                .mesh
                .positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]])
                .collect();
            let name = if model.name.is_empty() {
                format!("{}_{}", label, index)
            } else {
                model.name
            };
            ParsedNode {
                name,
                transform: Transform::default(),
                geometry: Some(Geometry {
                    positions,
                    indices: model.mesh.indices,
                }),
                material: None,
                children: Vec::new(),
            }
        })
        .collect();

    Ok(ParsedAsset {
        label: label.to_string(),
        roots,
        materials: Vec::new(),
    })
}
